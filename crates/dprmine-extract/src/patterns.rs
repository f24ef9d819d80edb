//! Pattern extraction stage.
//!
//! For each field category a fixed, ordered list of patterns is tried and
//! **all** matches from **all** patterns are collected, not just the first
//! successful pattern — downstream resolution picks among the alternatives.
//! Tiers are ordered by specificity: a labeled form ("Total Project Cost:
//! ...") ranks before a bare currency-symbol form, which ranks before a bare
//! number-with-unit-word form ("... crore").

use regex::Regex;

use crate::candidates::{CandidateSet, CandidateSource, FieldCategory, RawCandidate};
use crate::rx;

/// Pattern tiers per category, most specific first.
fn pattern_table() -> [(FieldCategory, &'static [&'static str]); 7] {
    [
        (
            FieldCategory::Budget,
            &[
                r"(?i)(?:Total Project Cost|Project Cost|Estimated Cost|Outlay|Project Tentative Outlay|Fund Allocation|Budget)[:\-]?\s*([₹Rs$€£.\s,0-9]+(?:crore|lakh|million|billion)?)",
                r"[₹Rs$€£]\s*[\d,]+(?:\.\d+)?",
                r"(?i)([\d,]+(?:\.\d+)?)\s*(?:crore|lakh|million|billion)",
            ],
        ),
        (
            FieldCategory::Date,
            &[
                r"\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b",
                r"\b\d{4}\b",
                r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s*\d{1,4}\b",
            ],
        ),
        (
            FieldCategory::Duration,
            &[
                r"(?i)(?:Project Duration|Duration|Timeline)[:\-]?\s*(\d+\s*(?:months?|years?))",
                r"(?i)\b\d+\s*(?:months?|years?)\b",
            ],
        ),
        (
            FieldCategory::Location,
            &[
                r"(?i)(?:State|District|Region|Location)[:\-]\s*([^\n,]+)",
                r"(?i)(?:located|situated)\s+(?:in|at)\s+([^\n,]+)",
            ],
        ),
        (
            FieldCategory::RiskZone,
            &[
                r"(?i)\b(?:flood|landslide|earthquake|disaster)\s*(?:prone|zone|area)\b",
                r"(?i)\b(?:risk|vulnerability)\s*(?:of|to)\s*(?:flood|landslide|earthquake)\b",
            ],
        ),
        (
            FieldCategory::EmployeeCount,
            &[
                r"(?i)(?:No\.?|Number of|Number)\s*(?:employees?|workers?|staff|laborers|engineers)[:\-]?\s*(\d{1,5})",
                r"(?i)\b(\d{1,5})\s*(?:employees?|workers?|staff|laborers|engineers|personnel)\b",
            ],
        ),
        (
            FieldCategory::Equipment,
            &[r"(?i)\b(excavator|bulldozer|crane|loader|truck|mixer|roller|driller|grader|paver)\b"],
        ),
    ]
}

struct TieredPattern {
    category: FieldCategory,
    tier: usize,
    regex: Regex,
}

/// Compiled pattern tables for one extraction pass.
///
/// Patterns that fail to compile are dropped at construction with a warning;
/// the category and the stage keep running on the remaining tiers.
pub struct PatternSet {
    patterns: Vec<TieredPattern>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternSet {
    pub fn standard() -> Self {
        let mut patterns = Vec::new();
        for (category, tiers) in pattern_table() {
            for (tier, source) in tiers.iter().enumerate() {
                if let Some(regex) = rx::compile(source) {
                    patterns.push(TieredPattern {
                        category,
                        tier,
                        regex,
                    });
                }
            }
        }
        PatternSet { patterns }
    }

    /// Collect every match of every pattern, tier-major then document order.
    ///
    /// A grouped pattern contributes its first capture group, an ungrouped
    /// pattern the whole match; blank captures are dropped.
    pub fn extract(&self, text: &str) -> CandidateSet {
        let mut set = CandidateSet::default();
        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let matched = match caps.get(1) {
                    Some(group) => group.as_str(),
                    None => caps.get(0).map(|m| m.as_str()).unwrap_or(""),
                };
                let matched = matched.trim();
                if matched.is_empty() {
                    continue;
                }
                set.push(RawCandidate {
                    category: pattern.category,
                    text: matched.to_string(),
                    source: CandidateSource::Pattern,
                    rank: pattern.tier,
                });
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_budget_ranks_before_bare_currency() {
        let set = PatternSet::standard()
            .extract("Total Project Cost: ₹1,23,45,678\nSome filler ₹99,000 here");
        let budgets: Vec<_> = set.texts(FieldCategory::Budget).collect();
        assert_eq!(budgets[0], "₹1,23,45,678");
        // The bare-currency tier re-reports the labeled amount plus the filler.
        assert!(budgets[1..].contains(&"₹99,000"));
        assert_eq!(set.category(FieldCategory::Budget)[0].rank, 0);
    }

    #[test]
    fn all_currency_matches_are_kept_in_document_order() {
        let set = PatternSet::standard().extract("₹30,00,000 then ₹25,00,000 then ₹3,00,000");
        let budgets: Vec<_> = set.texts(FieldCategory::Budget).collect();
        assert_eq!(budgets, vec!["₹30,00,000", "₹25,00,000", "₹3,00,000"]);
    }

    #[test]
    fn duration_and_dates_are_categorized() {
        let set = PatternSet::standard()
            .extract("Project Duration: 18 months\nStart: 01/04/2024 End: 30/09/2025");
        assert_eq!(set.first(FieldCategory::Duration), Some("18 months"));
        let dates: Vec<_> = set.texts(FieldCategory::Date).collect();
        assert_eq!(dates[0], "01/04/2024");
        assert_eq!(dates[1], "30/09/2025");
    }

    #[test]
    fn risk_zone_and_equipment_match_without_labels() {
        let set = PatternSet::standard()
            .extract("The site is a flood prone area. Crane and excavator on site.");
        assert_eq!(set.first(FieldCategory::RiskZone), Some("flood prone"));
        let equipment: Vec<_> = set.texts(FieldCategory::Equipment).collect();
        assert_eq!(equipment, vec!["Crane", "excavator"]);
    }

    #[test]
    fn employee_count_prefers_labeled_tier() {
        let set =
            PatternSet::standard().extract("Number of Employees: 120\nAlso 40 laborers on site");
        assert_eq!(set.first(FieldCategory::EmployeeCount), Some("120"));
        assert_eq!(set.nth(FieldCategory::EmployeeCount, 1), Some("40"));
    }

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(PatternSet::standard().extract("").is_empty());
    }
}
