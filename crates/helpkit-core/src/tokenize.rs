//! Text normalization and word tokenization.

use std::collections::HashSet;

pub type TokenSet = HashSet<String>;

/// Lowercase and trim.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Normalize, then split on runs of non-alphanumeric characters.
/// Duplicates collapse; empty pieces are dropped.
pub fn tokenize(input: &str) -> TokenSet {
    normalize(input)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
