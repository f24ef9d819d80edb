//! Corrective extraction stage.
//!
//! Runs at most once per document, only when the quality gate fails, and
//! touches only the implicated fields: a defective title is re-derived with
//! looser heuristics, a missing or bled department is re-matched, and
//! geography fields that absorbed neighbouring section text are scrubbed.
//! Fields the gate did not implicate pass through untouched.

use crate::quality::{DefectKind, QualityVerdict};
use crate::record::StructuredRecord;
use crate::rx::{self, collapse_ws};

/// Produce a repaired copy of `record` for the defects in `verdict`.
pub fn repair(text: &str, record: &StructuredRecord, verdict: &QualityVerdict) -> StructuredRecord {
    let mut repaired = record.clone();

    if verdict.title_defective() {
        repaired.project_title = Some(repair_title(text));
    }

    let bled_department = repaired
        .department
        .as_deref()
        .map_or(false, |dept| dept.starts_with("Approved by"));
    if verdict.has(DefectKind::DepartmentMissing) || bled_department {
        repaired.department = Some(repair_department(text));
    }

    repaired.state = scrub_state(repaired.state.take(), text);
    repaired.district = scrub_district(repaired.district.take(), text);

    repaired
}

/// Looser title chain; always produces some title.
pub fn repair_title(text: &str) -> String {
    if let Some(title) = loose_labeled_title(text) {
        return title;
    }
    if let Some(title) = budget_context_title(text) {
        return title;
    }
    located_template_title(text)
}

fn loose_labeled_title(text: &str) -> Option<String> {
    for pattern in [
        r"(?i)Project\s*Title[:\-]?\s*([^.\n]{5,200})",
        r"(?i)Project\s*Name[:\-]?\s*([^.\n]{5,200})",
        r"(?i)Title[:\-]?\s*([^.\n]{5,200})",
        r"(?i)Name\s*of\s*the\s*Project[:\-]?\s*([^.\n]{5,200})",
        r"(?i)Name\s*of\s*Project[:\-]?\s*([^.\n]{5,200})",
    ] {
        let matched = rx::compile(pattern)
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps.get(1).map(|g| g.as_str().trim().to_string()));
        if let Some(title) = matched {
            let len = title.chars().count();
            let lower = title.to_lowercase();
            let templated = ["sample", "template", "model"]
                .iter()
                .any(|word| lower.contains(word));
            if len > 5 && len < 200 && !templated {
                return Some(title);
            }
        }
    }
    None
}

/// Text preceding a `BUDGET:` marker often holds the project description.
/// Short, concrete contexts are reused directly; boilerplate contexts fall
/// through to the domain templates.
fn budget_context_title(text: &str) -> Option<String> {
    let re = rx::compile(r"(?si)^(.*?)\s*BUDGET[:\-]")?;
    let context = re.captures(text)?.get(1)?.as_str().trim().to_string();
    if context.is_empty() || context.chars().count() >= 200 {
        return None;
    }
    let lower = context.to_lowercase();
    if lower.contains("local communities") && lower.contains("development") {
        Some(domain_template(text).to_string())
    } else {
        Some(collapse_ws(&context))
    }
}

fn domain_template(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("road") && lower.contains("construction") {
        "Road Construction and Community Development Project"
    } else if lower.contains("development") {
        "Community Development Project"
    } else {
        "Infrastructure Development Project"
    }
}

/// Final fallback: a domain template, with an "in X" variant when the text
/// names a location ahead of a district/state/region word.
fn located_template_title(text: &str) -> String {
    let lower = text.to_lowercase();
    let location = located_phrase(text);
    if lower.contains("road") && lower.contains("construction") {
        return match location {
            Some(place) => format!("Road Construction Project in {place}"),
            None => "Road Construction and Community Development Project".to_string(),
        };
    }
    if lower.contains("development") {
        return match location {
            Some(place) => format!("Community Development Project in {place}"),
            None => "Community Development Project".to_string(),
        };
    }
    match location {
        Some(place) => format!("Infrastructure Development Project in {place}"),
        None => "Infrastructure Development Project".to_string(),
    }
}

fn located_phrase(text: &str) -> Option<String> {
    let re = rx::compile(r"(?i)\b(?:in|at)\s+([A-Za-z][A-Za-z ]{2,59}?)\s+(?:district|state|region)\b")?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|g| g.as_str().trim().to_string())
}

/// Re-derive the department, trimming trailing `Date:` bleed; falls back to
/// a fixed generic department rather than leaving the field empty twice.
pub fn repair_department(text: &str) -> String {
    if let Some(re) = rx::compile(r"(?i)Prepared by[:\-]?\s*([^\n]{3,200})") {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            let mut dept = group.as_str().trim().to_string();
            if let Some(idx) = dept.find("Date:") {
                dept.truncate(idx);
                dept = dept.trim_end().to_string();
            }
            if dept.contains("Civil Engineering Department") {
                return "Civil Engineering Department".to_string();
            }
            if !dept.is_empty() {
                return dept;
            }
        }
    }
    for name in [
        "Civil Engineering Department",
        "Public Works Department",
        "Road Construction Department",
    ] {
        let found = rx::compile(&format!(r"(?i){name}")).map_or(false, |re| re.is_match(text));
        if found {
            return name.to_string();
        }
    }
    "Civil Engineering Department".to_string()
}

/// A state value that absorbed the "Geographical Features" section heading
/// is re-matched from the labeled line, or failing that the suffix is
/// stripped from the held value. Nothing is fabricated when neither works.
fn scrub_state(state: Option<String>, text: &str) -> Option<String> {
    let state = state?;
    if !state.contains("Geographical Features") {
        return Some(state);
    }
    if let Some(group) = rx::compile(r"(?i)State[:\-]?\s*([^\n,]+)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1).map(|g| g.as_str().trim().to_string()))
    {
        let clean = strip_suffix_from(&group, " Geographical Features");
        if !clean.is_empty() {
            return Some(clean);
        }
    }
    let clean = strip_suffix_from(&state, " Geographical Features");
    (!clean.is_empty()).then_some(clean)
}

/// District values bleed the following " State:" label instead.
fn scrub_district(district: Option<String>, text: &str) -> Option<String> {
    let district = district?;
    if !district.contains(" State:") {
        return Some(district);
    }
    if let Some(group) = rx::compile(r"(?i)District[:\-]?\s*([^\n,]+)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1).map(|g| g.as_str().trim().to_string()))
    {
        let clean = strip_suffix_from(&group, " State:");
        if !clean.is_empty() {
            return Some(clean);
        }
    }
    let clean = strip_suffix_from(&district, " State:");
    (!clean.is_empty()).then_some(clean)
}

fn strip_suffix_from(value: &str, marker: &str) -> String {
    value
        .split(marker)
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{self, DefectKind};
    use std::collections::BTreeSet;

    fn failing_verdict(defects: &[DefectKind]) -> QualityVerdict {
        QualityVerdict {
            acceptable: false,
            reasons: defects.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn loose_label_beats_templates() {
        let text = "Project Title: Hill Road Strengthening Works\nBUDGET: ₹10,00,000";
        assert_eq!(repair_title(text), "Hill Road Strengthening Works");
    }

    #[test]
    fn short_budget_context_is_reused_directly() {
        let text = "Strengthening of approach   roads near the bridge\nBUDGET: ₹10,00,000";
        assert_eq!(
            repair_title(text),
            "Strengthening of approach roads near the bridge"
        );
    }

    #[test]
    fn boilerplate_budget_context_falls_to_domain_template() {
        let text =
            "Benefits development of local communities along the road construction corridor\nBUDGET: ₹10,00,000";
        assert_eq!(
            repair_title(text),
            "Road Construction and Community Development Project"
        );
    }

    #[test]
    fn located_template_names_the_place() {
        let text = "road construction works planned in Kamrup district for 2024";
        assert_eq!(repair_title(text), "Road Construction Project in Kamrup");
        assert_eq!(
            repair_title("road construction tender notice"),
            "Road Construction and Community Development Project"
        );
        assert_eq!(
            repair_title("unrelated procurement note"),
            "Infrastructure Development Project"
        );
    }

    #[test]
    fn department_trims_date_bleed() {
        assert_eq!(
            repair_department("Prepared by: Executive Engineer Office Date: 01/04/2024"),
            "Executive Engineer Office"
        );
        assert_eq!(
            repair_department("Prepared by: Office of the Civil Engineering Department, Govt."),
            "Civil Engineering Department"
        );
        assert_eq!(repair_department("no signature block"), "Civil Engineering Department");
    }

    #[test]
    fn geography_bleed_is_stripped_not_replaced() {
        let record = StructuredRecord {
            project_title: Some("Hill Road Upgrade".into()),
            state: Some("Assam Geographical Features".into()),
            district: Some("Kamrup State: Assam".into()),
            ..Default::default()
        };
        let verdict = failing_verdict(&[DefectKind::DepartmentMissing]);
        let repaired = repair("no labeled lines here", &record, &verdict);
        assert_eq!(repaired.state.as_deref(), Some("Assam"));
        assert_eq!(repaired.district.as_deref(), Some("Kamrup"));
    }

    #[test]
    fn unimplicated_fields_survive_repair() {
        let record = StructuredRecord {
            project_title: None,
            estimated_cost: Some("₹30,00,000".into()),
            duration: Some("18 months".into()),
            department: Some("Public Works Department".into()),
            ..Default::default()
        };
        let verdict = quality::assess(&record);
        assert!(verdict.has(DefectKind::TitleMissing));
        let repaired = repair("road construction in Kamrup district", &record, &verdict);
        assert_eq!(repaired.estimated_cost.as_deref(), Some("₹30,00,000"));
        assert_eq!(repaired.duration.as_deref(), Some("18 months"));
        assert_eq!(repaired.department.as_deref(), Some("Public Works Department"));
        assert_eq!(
            repaired.project_title.as_deref(),
            Some("Road Construction Project in Kamrup")
        );
    }

    #[test]
    fn approved_by_department_is_rederived() {
        let record = StructuredRecord {
            project_title: None,
            department: Some("Approved by: District Collector".into()),
            ..Default::default()
        };
        let verdict = failing_verdict(&[DefectKind::TitleMissing]);
        let repaired = repair(
            "Prepared by: Water Resources Department\ndevelopment plan",
            &record,
            &verdict,
        );
        assert_eq!(repaired.department.as_deref(), Some("Water Resources Department"));
    }
}
