//! Token lists for `itemprop`, `itemtype` and `itemref`

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tokens borrowed from an attribute value, in attribute order.
/// Most attributes carry one or two tokens.
pub type Tokens<'a> = SmallVec<[&'a str; 4]>;

/// How an attribute value is cut into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tokenization {
    /// Split on runs of ASCII whitespace, keep the first occurrence of each
    /// token. HTML "set of space-separated tokens".
    #[default]
    AsciiWhitespace,
    /// Trim, then split on every single U+0020. `"a  b"` yields
    /// `["a", "", "b"]` and repeats are kept.
    SingleSpace,
}

impl Tokenization {
    /// Split `value` into tokens. Blank input always yields no tokens.
    pub fn split(self, value: &str) -> Tokens<'_> {
        let trimmed = value.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() {
            return Tokens::new();
        }

        match self {
            Tokenization::AsciiWhitespace => {
                let mut tokens = Tokens::new();
                for token in trimmed.split_ascii_whitespace() {
                    if !tokens.contains(&token) {
                        tokens.push(token);
                    }
                }
                tokens
            }
            Tokenization::SingleSpace => trimmed.split(' ').collect(),
        }
    }
}
