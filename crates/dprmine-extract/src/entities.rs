//! Auxiliary entity stage.
//!
//! Wraps an optional generic entity recognizer. The pipeline only consumes
//! whatever spans the recognizer offers (money/date/place/org/person) and
//! must behave identically in *shape* when it is absent: every kind present,
//! no spans. Absence degrades recall, never correctness.
//!
//! The built-in [`LexiconRecognizer`] is a gazetteer/regex stand-in gated
//! behind the `lexicon-ner` feature; it is initialized lazily once per
//! process and treated as read-only thereafter.

use std::sync::OnceLock;

use regex::Regex;
#[cfg(feature = "lexicon-ner")]
use tracing::warn;

use crate::candidates::{EntityKind, EntityMap};

/// Indian states and union territories recognized as place/state spans.
pub const STATE_GAZETTEER: [&str; 29] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
];

/// A generic entity recognizer the pipeline may consume.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> EntityMap;
}

/// Failure to construct a recognizer. Callers degrade, they do not abort.
#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("invalid recognizer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Lexicon- and regex-backed recognizer for the entity kinds the resolution
/// stage consumes. Deliberately shallow: gazetteer states, currency spans,
/// month-name dates, organization noun phrases, honorific-prefixed names.
pub struct LexiconRecognizer {
    money: Regex,
    date: Regex,
    state: Regex,
    district: Regex,
    org: Regex,
    person: Regex,
}

impl LexiconRecognizer {
    pub fn new() -> Result<Self, RecognizerError> {
        let state_alternation = STATE_GAZETTEER.join("|");
        Ok(LexiconRecognizer {
            money: Regex::new(
                r"(?:[₹$€£]\s*[\d,]+(?:\.\d+)?)|(?i:\b[\d,]+(?:\.\d+)?\s*(?:crore|lakh|million|billion)\b)",
            )?,
            date: Regex::new(
                r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s+\d{1,2},?\s*\d{2,4}\b|\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b",
            )?,
            state: Regex::new(&format!(r"\b(?:{state_alternation})\b"))?,
            district: Regex::new(r"\b([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)?)\s+[Dd]istrict\b")?,
            org: Regex::new(
                r"(?:[A-Z][A-Za-z&.]*\s+){0,4}(?:Department|Ministry|Authority|Board|Corporation)(?:\s+of\s+[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*)?",
            )?,
            person: Regex::new(
                r"\b(?:Shri|Smt\.?|Er\.?|Dr\.?|Mr\.?|Mrs\.?|Ms\.?)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,3}",
            )?,
        })
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, text: &str) -> EntityMap {
        let mut map = EntityMap::empty();
        for m in self.money.find_iter(text) {
            map.push(EntityKind::Money, m.as_str().trim());
        }
        for m in self.date.find_iter(text) {
            map.push(EntityKind::Date, m.as_str().trim());
        }
        for m in self.state.find_iter(text) {
            map.push(EntityKind::Place, m.as_str());
        }
        for caps in self.district.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                map.push(EntityKind::Place, group.as_str());
            }
        }
        for m in self.org.find_iter(text) {
            map.push(EntityKind::Org, m.as_str().trim());
        }
        for m in self.person.find_iter(text) {
            map.push(EntityKind::Person, m.as_str().trim());
        }
        map
    }
}

#[cfg(feature = "lexicon-ner")]
fn build_default() -> Option<LexiconRecognizer> {
    match LexiconRecognizer::new() {
        Ok(recognizer) => Some(recognizer),
        Err(err) => {
            warn!(%err, "lexicon recognizer unavailable, entity stage degrades to empty output");
            None
        }
    }
}

#[cfg(not(feature = "lexicon-ner"))]
fn build_default() -> Option<LexiconRecognizer> {
    None
}

/// Process-wide default recognizer, initialized once, read-only after.
pub fn default_recognizer() -> Option<&'static dyn EntityRecognizer> {
    static DEFAULT: OnceLock<Option<LexiconRecognizer>> = OnceLock::new();
    DEFAULT
        .get_or_init(build_default)
        .as_ref()
        .map(|r| r as &dyn EntityRecognizer)
}

/// Run the entity stage with whatever capability is available.
pub fn recognize_with(recognizer: Option<&dyn EntityRecognizer>, text: &str) -> EntityMap {
    match recognizer {
        Some(recognizer) => recognizer.recognize(text),
        None => EntityMap::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_capability_returns_well_shaped_empty_map() {
        let map = recognize_with(None, "Total Project Cost: ₹50,00,000 in Assam");
        assert_eq!(map, EntityMap::empty());
        for kind in EntityKind::ALL {
            assert!(map.kind(kind).is_empty());
        }
    }

    #[test]
    fn lexicon_recognizer_finds_core_kinds() {
        let recognizer = LexiconRecognizer::new().unwrap();
        let map = recognizer.recognize(
            "Prepared by: Public Works Department\n\
             The road runs through Kamrup district, Assam.\n\
             Sanctioned ₹12,50,000 on January 5, 2024 by Shri Ramesh Kumar.",
        );
        assert_eq!(map.first(EntityKind::Money), Some("₹12,50,000"));
        assert_eq!(map.first(EntityKind::Date), Some("January 5, 2024"));
        assert!(map.kind(EntityKind::Place).contains(&"Assam".to_string()));
        assert!(map.kind(EntityKind::Place).contains(&"Kamrup".to_string()));
        assert_eq!(map.first(EntityKind::Org), Some("Public Works Department"));
        assert_eq!(map.first(EntityKind::Person), Some("Shri Ramesh Kumar"));
    }

    #[test]
    fn default_recognizer_is_stable_across_calls() {
        let first = default_recognizer().is_some();
        let second = default_recognizer().is_some();
        assert_eq!(first, second);
    }
}
