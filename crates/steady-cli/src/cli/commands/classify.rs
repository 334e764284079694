//! `steady classify`: run the summary filter over saved output.
//!
//! Exits 1 when the summary reports a change, so it can gate scripts.

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use steady_core::classify::{classify, classify_annotated, tokenize, Selection};
use steady_core::render_report;

use crate::cli::args::ClassifyArgs;
use crate::exit_codes::{SUCCESS, UNSETTLED};

pub fn run(args: ClassifyArgs) -> Result<i32> {
    let raw = read_input(args.input.as_deref())?;
    let tokens = tokenize(&raw);
    let classified = classify(&tokens);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.explain {
        for line in explain_lines(&tokens) {
            writeln!(out, "{line}")?;
        }
    } else {
        out.write_all(&render_report(classified.tokens()))?;
        writeln!(out)?;
    }

    if classified.has_change() {
        let markers: Vec<String> = classified
            .change_markers()
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect();
        eprintln!("change reported: {}", markers.join(", "));
        return Ok(UNSETTLED);
    }
    Ok(SUCCESS)
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn explain_lines(tokens: &[&[u8]]) -> Vec<String> {
    classify_annotated(tokens)
        .selected
        .iter()
        .map(|s| {
            let reason = match s.selection {
                Selection::Opened(rule) => format!("{rule:?}"),
                Selection::Lookahead => "lookahead".to_string(),
            };
            format!(
                "{:>5}  {:<13} {}",
                s.index,
                reason,
                String::from_utf8_lossy(s.token)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_names_rule_and_position() {
        let raw = b"noise (p = 0.01 < 0.05)";
        let lines = explain_lines(&tokenize(raw));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "    1  PValue        (p");
        assert_eq!(lines[1], "    2  lookahead     =");
    }
}
