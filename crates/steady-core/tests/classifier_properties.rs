use proptest::prelude::*;
use steady_core::classify::{classify, classify_annotated, classify_output, Selection};
use steady_core::report::{parse_report, render_report};

/// Tokens drawn mostly from the words that drive the classifier, plus noise.
fn token() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"Analyzing".to_vec()),
        Just(b"No".to_vec()),
        Just(b"Performance".to_vec()),
        Just(b"(p".to_vec()),
        Just(b"improved.".to_vec()),
        Just(b"regressed.".to_vec()),
        "\\[[+-]?[0-9.]{1,4}%?".prop_map(String::into_bytes),
        "[a-z]{1,6}(/[a-z]{1,6})?".prop_map(String::into_bytes),
        proptest::collection::vec(33u8..=126, 1..8),
    ]
}

fn stream() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(token(), 0..64)
}

fn as_slices(tokens: &[Vec<u8>]) -> Vec<&[u8]> {
    tokens.iter().map(Vec::as_slice).collect()
}

proptest! {
    #[test]
    fn classification_is_deterministic_and_pass_independent(a in stream(), b in stream()) {
        let first = classify(&as_slices(&a));
        // An unrelated pass in between must not leak state.
        let _ = classify(&as_slices(&b));
        let second = classify(&as_slices(&a));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn lookahead_tokens_directly_follow_a_kept_or_dropped_opener(tokens in stream()) {
        let slices = as_slices(&tokens);
        let annotated = classify_annotated(&slices);
        for (pos, sel) in annotated.selected.iter().enumerate() {
            if sel.selection != Selection::Lookahead {
                continue;
            }
            prop_assert!(sel.index > 0);
            match pos.checked_sub(1).map(|p| &annotated.selected[p]) {
                // Contiguous with the previous kept token...
                Some(prev) if prev.index + 1 == sel.index => {}
                // ...or right after a dropped `Analyzing` label.
                _ => prop_assert_eq!(slices[sel.index - 1], b"Analyzing".as_slice()),
            }
        }
    }

    #[test]
    fn selected_tokens_preserve_stream_order(tokens in stream()) {
        let slices = as_slices(&tokens);
        let annotated = classify_annotated(&slices);
        let indices: Vec<usize> = annotated.selected.iter().map(|s| s.index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(indices, sorted);
    }

    #[test]
    fn reclassifying_a_stable_output_stays_stable(tokens in stream()) {
        let raw = tokens.join(&b' ');
        let once = classify_output(&raw);
        prop_assume!(!once.has_change());
        let again = classify_output(&raw);
        prop_assert!(!again.has_change());
        prop_assert_eq!(once, again);
    }

    #[test]
    fn report_round_trips_tokens(tokens in stream()) {
        let classified = classify(&as_slices(&tokens));
        let rendered = render_report(classified.tokens());
        prop_assert_eq!(parse_report(&rendered), classified.tokens().to_vec());
    }
}
