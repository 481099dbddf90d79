//! Small shared helpers

/// Normalize a free-text phrase for matching: lowercase, trimmed,
/// internal whitespace collapsed to single spaces.
pub fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
