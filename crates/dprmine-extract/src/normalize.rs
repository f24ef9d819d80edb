//! Text normalization, run before any pattern matching.
//!
//! Report text arrives from external converters (PDF/Word/image OCR) with
//! carriage returns, page-number footers, and long separator rules between
//! sections. Patterns anchored on line boundaries misfire on those
//! artifacts, so normalization is the first pipeline step, not an option.

use crate::rx;

/// Normalize raw report text for pattern matching.
///
/// - line breaks standardized to `\n`
/// - `Page N of M` footers stripped
/// - runs of three or more separator characters collapsed to a space
/// - runs of blank lines squeezed to a single line break
pub fn normalize(text: &str) -> String {
    let mut out = text.replace("\r\n", "\n").replace('\r', "\n");

    if let Some(re) = rx::compile(r"[-=_*]{3,}") {
        out = re.replace_all(&out, " ").into_owned();
    }
    if let Some(re) = rx::compile(r"(?i)Page\s*\d+\s*of\s*\d+") {
        out = re.replace_all(&out, " ").into_owned();
    }
    if let Some(re) = rx::compile(r"\n\s*\n+") {
        out = re.replace_all(&out, "\n").into_owned();
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_returns_become_newlines() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn page_footers_are_stripped() {
        let text = "Project Title: Road Upgrade\nPage 3 of 12\nState: Assam";
        let clean = normalize(text);
        assert!(!clean.contains("Page 3"));
        assert!(clean.contains("Project Title: Road Upgrade"));
        assert!(clean.contains("State: Assam"));
    }

    #[test]
    fn separator_runs_collapse() {
        let clean = normalize("SECTION A\n----------\nSECTION B\n==========\nend");
        assert!(!clean.contains("---"));
        assert!(!clean.contains("==="));
    }

    #[test]
    fn blank_line_runs_squeeze() {
        let clean = normalize("a\n\n\n\nb");
        assert_eq!(clean, "a\nb");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }
}
