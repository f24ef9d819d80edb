//! Pipeline driver.
//!
//! The stages are wired as an explicit state machine:
//!
//! ```text
//! Initial -> PatternExtracted -> Combined -> QualityChecked -> Final
//!                                                 \-> Repaired -> Final
//! ```
//!
//! The corrective stage runs at most once; there is no path from `Repaired`
//! back to `Combined`, so a repaired record is final even if it would fail
//! the gate again.

use tracing::debug;

use crate::candidates::{CandidateSet, EntityMap};
use crate::entities::{self, EntityRecognizer};
use crate::normalize::normalize;
use crate::patterns::PatternSet;
use crate::quality::{self, QualityVerdict};
use crate::record::StructuredRecord;
use crate::repair;
use crate::resolve;

/// One position in the extraction state machine.
pub enum ExtractionState {
    Initial,
    PatternExtracted {
        candidates: CandidateSet,
        entities: EntityMap,
    },
    Combined {
        record: StructuredRecord,
    },
    QualityChecked {
        record: StructuredRecord,
        verdict: QualityVerdict,
    },
    Repaired {
        record: StructuredRecord,
    },
    Final {
        record: StructuredRecord,
    },
}

impl ExtractionState {
    pub fn is_final(&self) -> bool {
        matches!(self, ExtractionState::Final { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtractionState::Initial => "initial",
            ExtractionState::PatternExtracted { .. } => "pattern_extracted",
            ExtractionState::Combined { .. } => "combined",
            ExtractionState::QualityChecked { .. } => "quality_checked",
            ExtractionState::Repaired { .. } => "repaired",
            ExtractionState::Final { .. } => "final",
        }
    }
}

enum Recognizer {
    /// The lazily-initialized process-wide recognizer, when built.
    Process,
    Disabled,
    Custom(Box<dyn EntityRecognizer>),
}

/// Full extraction record plus how the pipeline arrived at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub record: StructuredRecord,
    pub verdict: QualityVerdict,
    pub repaired: bool,
}

/// The extraction pipeline. Stateless across documents; one instance may be
/// shared freely between threads.
pub struct Extractor {
    patterns: PatternSet,
    recognizer: Recognizer,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Pipeline with the process-wide entity recognizer, if available.
    pub fn new() -> Self {
        Extractor {
            patterns: PatternSet::standard(),
            recognizer: Recognizer::Process,
        }
    }

    /// Pipeline with the entity stage deliberately absent.
    pub fn without_recognizer() -> Self {
        Extractor {
            patterns: PatternSet::standard(),
            recognizer: Recognizer::Disabled,
        }
    }

    /// Pipeline with a caller-supplied recognizer.
    pub fn with_recognizer(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Extractor {
            patterns: PatternSet::standard(),
            recognizer: Recognizer::Custom(recognizer),
        }
    }

    fn recognizer(&self) -> Option<&dyn EntityRecognizer> {
        match &self.recognizer {
            Recognizer::Process => entities::default_recognizer(),
            Recognizer::Disabled => None,
            Recognizer::Custom(custom) => Some(custom.as_ref()),
        }
    }

    /// Advance the state machine one transition on normalized text.
    pub fn step(&self, state: ExtractionState, text: &str) -> ExtractionState {
        match state {
            ExtractionState::Initial => ExtractionState::PatternExtracted {
                candidates: self.patterns.extract(text),
                entities: entities::recognize_with(self.recognizer(), text),
            },
            ExtractionState::PatternExtracted {
                candidates,
                entities,
            } => ExtractionState::Combined {
                record: resolve::resolve(text, &candidates, &entities),
            },
            ExtractionState::Combined { record } => {
                let verdict = quality::assess(&record);
                ExtractionState::QualityChecked { record, verdict }
            }
            ExtractionState::QualityChecked { record, verdict } => {
                if verdict.acceptable {
                    ExtractionState::Final { record }
                } else {
                    debug!(reasons = ?verdict.reasons, "quality gate failed, repairing");
                    ExtractionState::Repaired {
                        record: repair::repair(text, &record, &verdict),
                    }
                }
            }
            ExtractionState::Repaired { record } => ExtractionState::Final { record },
            ExtractionState::Final { record } => ExtractionState::Final { record },
        }
    }

    /// Extract one document to a record.
    pub fn extract(&self, text: &str) -> StructuredRecord {
        self.extract_with_report(text).record
    }

    /// Extract one document, reporting the gate verdict and whether the
    /// corrective stage ran.
    ///
    /// An empty document (after normalization) short-circuits to the
    /// all-absent record with no corrective attempt; the verdict reflects
    /// that record as-is.
    pub fn extract_with_report(&self, text: &str) -> ExtractionReport {
        let text = normalize(text);
        if text.is_empty() {
            debug!("empty document, nothing to extract");
            let record = StructuredRecord::default();
            let verdict = quality::assess(&record);
            return ExtractionReport {
                record,
                verdict,
                repaired: false,
            };
        }

        let mut state = ExtractionState::Initial;
        let mut gate_verdict: Option<QualityVerdict> = None;
        let mut repaired = false;
        loop {
            state = self.step(state, &text);
            debug!(state = state.label(), "pipeline transition");
            match state {
                ExtractionState::Final { record } => {
                    let verdict = gate_verdict.unwrap_or_else(|| quality::assess(&record));
                    return ExtractionReport {
                        record,
                        verdict,
                        repaired,
                    };
                }
                other => {
                    if let ExtractionState::QualityChecked { verdict, .. } = &other {
                        gate_verdict = Some(verdict.clone());
                    }
                    if matches!(other, ExtractionState::Repaired { .. }) {
                        repaired = true;
                    }
                    state = other;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_DOC: &str = "Project Title: Hill Road Upgrade\n\
                             Prepared by: Public Works Department\n\
                             Total Project Cost: ₹45,00,000\n\
                             Project Duration: 24 months";

    #[test]
    fn states_advance_in_order() {
        let extractor = Extractor::without_recognizer();
        let mut state = ExtractionState::Initial;
        let mut labels = vec![state.label()];
        while !state.is_final() {
            state = extractor.step(state, CLEAN_DOC);
            labels.push(state.label());
        }
        assert_eq!(
            labels,
            vec![
                "initial",
                "pattern_extracted",
                "combined",
                "quality_checked",
                "final"
            ]
        );
    }

    #[test]
    fn defective_document_routes_through_repair_exactly_once() {
        let extractor = Extractor::without_recognizer();
        // Boilerplate words keep the leading-line title heuristic from firing.
        let report = extractor.extract_with_report(
            "Sample road construction template in Kamrup district\nfiller line without labels",
        );
        assert!(!report.verdict.acceptable);
        assert!(report.repaired);
        assert_eq!(
            report.record.project_title.as_deref(),
            Some("Road Construction Project in Kamrup")
        );
        assert_eq!(
            report.record.department.as_deref(),
            Some("Civil Engineering Department")
        );
    }

    #[test]
    fn clean_document_skips_repair() {
        let extractor = Extractor::without_recognizer();
        let report = extractor.extract_with_report(CLEAN_DOC);
        assert!(report.verdict.acceptable);
        assert!(!report.repaired);
        assert_eq!(report.record.project_title.as_deref(), Some("Hill Road Upgrade"));
    }

    #[test]
    fn empty_input_yields_all_absent_record_without_repair() {
        let extractor = Extractor::without_recognizer();
        for text in ["", "   \n\n  ", "\r\n"] {
            let report = extractor.extract_with_report(text);
            assert!(report.record.is_all_absent(), "{text:?}");
            assert!(!report.repaired);
        }
    }

    #[test]
    fn final_state_is_absorbing() {
        let extractor = Extractor::without_recognizer();
        let state = ExtractionState::Final {
            record: StructuredRecord::default(),
        };
        let next = extractor.step(state, CLEAN_DOC);
        assert!(next.is_final());
    }

    #[test]
    fn recognizer_absence_degrades_not_fails() {
        let with = Extractor::new().extract(CLEAN_DOC);
        let without = Extractor::without_recognizer().extract(CLEAN_DOC);
        // Labeled fields never depend on the entity stage.
        assert_eq!(with.project_title, without.project_title);
        assert_eq!(with.duration, without.duration);
        assert_eq!(with.estimated_cost, without.estimated_cost);
    }
}
