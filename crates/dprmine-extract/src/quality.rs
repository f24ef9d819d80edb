//! Quality gate between resolution and the corrective stage.
//!
//! The gate is a set of independent defect predicates over the resolved
//! record. It never mutates anything; it only reports which defects are
//! present so the corrective stage can repair exactly those fields.

use std::collections::BTreeSet;

use crate::record::StructuredRecord;

/// Titles that mark an unfilled template rather than a real project.
pub const PLACEHOLDER_TITLES: [&str; 4] = [
    "Sample Project",
    "Model DPR",
    "DPR Template",
    "Infrastructure Development Project",
];

/// Longest title accepted without repair, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// One detected defect in a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DefectKind {
    TitleMissing,
    TitleTooLong,
    PlaceholderTitle,
    DepartmentMissing,
}

/// Outcome of the quality gate for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityVerdict {
    pub acceptable: bool,
    pub reasons: BTreeSet<DefectKind>,
}

impl QualityVerdict {
    pub fn has(&self, defect: DefectKind) -> bool {
        self.reasons.contains(&defect)
    }

    /// True when any title defect is present.
    pub fn title_defective(&self) -> bool {
        self.has(DefectKind::TitleMissing)
            || self.has(DefectKind::TitleTooLong)
            || self.has(DefectKind::PlaceholderTitle)
    }
}

/// Run every defect predicate; any one defect makes the record unacceptable.
pub fn assess(record: &StructuredRecord) -> QualityVerdict {
    let mut reasons = BTreeSet::new();
    match record.project_title.as_deref() {
        None => {
            reasons.insert(DefectKind::TitleMissing);
        }
        Some(title) => {
            if title.chars().count() > MAX_TITLE_LEN {
                reasons.insert(DefectKind::TitleTooLong);
            }
            if is_placeholder_title(title) {
                reasons.insert(DefectKind::PlaceholderTitle);
            }
        }
    }
    if record.department.is_none() {
        reasons.insert(DefectKind::DepartmentMissing);
    }
    QualityVerdict {
        acceptable: reasons.is_empty(),
        reasons,
    }
}

pub fn is_placeholder_title(title: &str) -> bool {
    let trimmed = title.trim();
    PLACEHOLDER_TITLES
        .iter()
        .any(|placeholder| placeholder.eq_ignore_ascii_case(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(title: Option<&str>, department: Option<&str>) -> StructuredRecord {
        StructuredRecord {
            project_title: title.map(str::to_string),
            department: department.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn complete_record_is_acceptable() {
        let verdict = assess(&record_with(
            Some("Hill Road Upgrade"),
            Some("Public Works Department"),
        ));
        assert!(verdict.acceptable);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn missing_fields_are_independent_defects() {
        let verdict = assess(&record_with(None, None));
        assert!(!verdict.acceptable);
        assert!(verdict.has(DefectKind::TitleMissing));
        assert!(verdict.has(DefectKind::DepartmentMissing));
    }

    #[test]
    fn overlong_title_is_a_defect() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        let verdict = assess(&record_with(Some(&long), Some("PWD")));
        assert!(verdict.has(DefectKind::TitleTooLong));
        assert!(verdict.title_defective());

        let at_limit = "x".repeat(MAX_TITLE_LEN);
        assert!(assess(&record_with(Some(&at_limit), Some("PWD"))).acceptable);
    }

    #[test]
    fn placeholder_titles_are_rejected_case_insensitively() {
        for title in ["Model DPR", "model dpr", " Sample Project "] {
            let verdict = assess(&record_with(Some(title), Some("PWD")));
            assert!(verdict.has(DefectKind::PlaceholderTitle), "{title}");
        }
        assert!(!is_placeholder_title("Model DPR for Hill Roads"));
    }
}
