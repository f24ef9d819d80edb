//! Small regex helpers shared by the pipeline stages.

use regex::Regex;
use tracing::warn;

/// Compile a pattern, logging and skipping it on failure.
///
/// Every stage treats a pattern that fails to evaluate as a fault local to
/// that one pattern: the match is skipped, the category and the stage carry
/// on. Returning `None` here is what makes that contract uniform.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern, %err, "skipping invalid extraction pattern");
            None
        }
    }
}

/// Collapse internal whitespace runs to single spaces and trim.
pub(crate) fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_is_skipped() {
        assert!(compile(r"(unclosed").is_none());
        assert!(compile(r"\d+").is_some());
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(collapse_ws("  a\n b\t\tc "), "a b c");
    }
}
