//! Token filter that pulls the summary out of human-readable benchmark output.
//!
//! The output is split on whitespace and walked once. Certain tokens open a
//! window ("the next N tokens belong to this group"); tokens inside a window
//! are kept, everything else is dropped. The window size is the only state and
//! it lives in the fold accumulator, so a pass never sees a previous pass.

/// Tokens whose presence means the benchmark reported a change.
pub const CHANGE_MARKERS: [&[u8]; 2] = [b"improved.", b"regressed."];

/// The rule that opened (or dropped) a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `Analyzing`: the label is dropped, the next token is kept.
    Analyzing,
    /// `[+...` / `[-...`: change annotation and the two tokens after it.
    ChangeBracket,
    /// `[...`: benchmark header and the five tokens after it.
    Bracket,
    /// `(p`: p-value and the four tokens after it.
    PValue,
    /// `Performance`: "Performance has regressed." style verdicts.
    Performance,
    /// `No`: "No change in performance detected."
    NoChange,
}

impl Rule {
    fn match_token(token: &[u8]) -> Option<Self> {
        if token == b"Analyzing" {
            Some(Self::Analyzing)
        } else if token.starts_with(b"[+") || token.starts_with(b"[-") {
            Some(Self::ChangeBracket)
        } else if token.starts_with(b"[") {
            Some(Self::Bracket)
        } else if token == b"(p" {
            Some(Self::PValue)
        } else if token == b"Performance" {
            Some(Self::Performance)
        } else if token == b"No" {
            Some(Self::NoChange)
        } else {
            None
        }
    }

    /// How many following tokens the rule pulls in.
    pub fn window(self) -> usize {
        match self {
            Self::Analyzing => 1,
            Self::ChangeBracket => 2,
            Self::Bracket => 5,
            Self::PValue => 4,
            Self::Performance => 2,
            Self::NoChange => 3,
        }
    }

    /// Whether the opening token itself is part of the summary.
    pub fn keeps_opener(self) -> bool {
        !matches!(self, Self::Analyzing)
    }
}

/// Why a token was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The token opened a window under this rule.
    Opened(Rule),
    /// The token fell inside a window opened earlier.
    Lookahead,
}

/// A kept token with its position in the original stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedToken<'a> {
    pub index: usize,
    pub token: &'a [u8],
    pub selection: Selection,
}

/// Result of one annotated classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<'a> {
    pub selected: Vec<SelectedToken<'a>>,
    /// Window left open when the stream ended.
    pub remaining: usize,
}

/// The summary selected from one run's standard output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    tokens: Vec<Vec<u8>>,
}

impl Classified {
    pub fn new(tokens: Vec<Vec<u8>>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Vec<u8>] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Vec<u8>> {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether any token is exactly `improved.` or `regressed.`.
    pub fn has_change(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| CHANGE_MARKERS.contains(&t.as_slice()))
    }

    /// The change markers present, in stream order.
    pub fn change_markers(&self) -> Vec<&[u8]> {
        self.tokens
            .iter()
            .map(Vec::as_slice)
            .filter(|t| CHANGE_MARKERS.contains(t))
            .collect()
    }
}

fn is_split_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Split raw output on ASCII whitespace, dropping empty pieces.
pub fn tokenize(output: &[u8]) -> Vec<&[u8]> {
    output
        .split(|b| is_split_byte(*b))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Classify a token stream, keeping each selected token's index and reason.
pub fn classify_annotated<'a>(tokens: &[&'a [u8]]) -> Annotated<'a> {
    let (selected, remaining) = tokens.iter().enumerate().fold(
        (Vec::new(), 0usize),
        |(mut selected, window), (index, &token)| {
            if window > 0 {
                selected.push(SelectedToken {
                    index,
                    token,
                    selection: Selection::Lookahead,
                });
                return (selected, window - 1);
            }
            match Rule::match_token(token) {
                Some(rule) => {
                    if rule.keeps_opener() {
                        selected.push(SelectedToken {
                            index,
                            token,
                            selection: Selection::Opened(rule),
                        });
                    }
                    (selected, rule.window())
                }
                None => (selected, 0),
            }
        },
    );
    Annotated {
        selected,
        remaining,
    }
}

/// Classify a token stream.
pub fn classify(tokens: &[&[u8]]) -> Classified {
    let annotated = classify_annotated(tokens);
    Classified::new(
        annotated
            .selected
            .into_iter()
            .map(|s| s.token.to_vec())
            .collect(),
    )
}

/// Tokenize and classify one run's standard output.
pub fn classify_output(output: &[u8]) -> Classified {
    classify(&tokenize(output))
}
