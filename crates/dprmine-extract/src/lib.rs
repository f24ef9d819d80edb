//! Structured fact extraction from detailed project report (DPR) text.
//!
//! Converts the free text of an infrastructure project report into one
//! [`StructuredRecord`] through a fixed pipeline: pattern extraction over
//! normalized text, an optional auxiliary entity stage, per-field
//! resolution, a quality gate, and a single corrective pass for records
//! the gate rejects. Extraction is pure and deterministic per document;
//! absence of a field is a valid outcome, never an error.
//!
//! ```
//! let record = dprmine_extract::extract(
//!     "Project Title: Hill Road Upgrade\nPrepared by: Public Works Department",
//! );
//! assert_eq!(record.project_title.as_deref(), Some("Hill Road Upgrade"));
//! assert_eq!(record.department.as_deref(), Some("Public Works Department"));
//! ```

pub mod candidates;
pub mod entities;
pub mod normalize;
pub mod patterns;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod repair;
pub mod resolve;

mod rx;

pub use candidates::{
    CandidateSet, CandidateSource, EntityKind, EntityMap, FieldCategory, RawCandidate,
};
pub use entities::{
    default_recognizer, EntityRecognizer, LexiconRecognizer, RecognizerError, STATE_GAZETTEER,
};
pub use pipeline::{ExtractionReport, ExtractionState, Extractor};
pub use quality::{DefectKind, QualityVerdict};
pub use record::StructuredRecord;

/// Extract one document with a default-configured pipeline.
pub fn extract(text: &str) -> StructuredRecord {
    Extractor::new().extract(text)
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn extraction_never_panics(text in ".{0,400}") {
            let _ = crate::extract(&text);
        }

        #[test]
        fn extraction_is_deterministic(text in "[ -~\n]{0,300}") {
            prop_assert_eq!(crate::extract(&text), crate::extract(&text));
        }

        #[test]
        fn whitespace_only_input_is_all_absent(text in "[ \t\r\n]{0,64}") {
            prop_assert!(crate::extract(&text).is_all_absent());
        }
    }
}
