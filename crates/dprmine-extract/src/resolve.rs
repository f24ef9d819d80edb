//! Resolution stage: candidates in, one structured record out.
//!
//! Every rule follows the same shape: try field-specific strategies in
//! priority order and stop at the first non-empty, plausible value. Each
//! rule is a free function so it can be tested in isolation; given a fixed
//! candidate set and entity map the resolved field is deterministic.

use std::collections::BTreeSet;

use crate::candidates::{CandidateSet, EntityKind, EntityMap, FieldCategory};
use crate::entities::STATE_GAZETTEER;
use crate::record::StructuredRecord;
use crate::rx::{self, collapse_ws};

/// Words that terminate title-line collection under the report heading.
const TITLE_STOP_WORDS: [&str; 4] = ["in", "project", "tentative", "outlay"];

/// Departments recognized without a label.
pub const KNOWN_DEPARTMENTS: [&str; 6] = [
    "Public Works Department",
    "Road Construction Department",
    "Water Resources Department",
    "Urban Development Department",
    "Rural Development Department",
    "Civil Engineering Department",
];

/// Construction materials recognized anywhere in the document.
pub const MATERIAL_LEXICON: [&str; 15] = [
    "cement",
    "steel",
    "sand",
    "bricks",
    "concrete",
    "asphalt",
    "gravel",
    "wood",
    "glass",
    "aggregate",
    "mortar",
    "paint",
    "tiles",
    "pipes",
    "bituminous concrete",
];

/// Any of these anywhere in the document marks guidelines as followed.
/// Permissive by inherited contract; tightening it is a product decision.
pub const COMPLIANCE_KEYWORDS: [&str; 7] = [
    "guideline",
    "is code",
    "standard",
    "policy",
    "compliance",
    "regulation",
    "framework",
];

/// Resolve one candidate record from the pattern and entity stage outputs.
pub fn resolve(text: &str, candidates: &CandidateSet, entities: &EntityMap) -> StructuredRecord {
    let region = candidates
        .first(FieldCategory::Location)
        .map(str::to_string)
        .or_else(|| entities.first(EntityKind::Place).map(str::to_string));
    let state = resolve_state(text, entities).or_else(|| region.clone());
    let costs = cost_positions(candidates);
    let estimated_cost = labeled_cost(text)
        .or_else(|| costs.estimated_cost.clone())
        .or_else(|| entities.first(EntityKind::Money).map(str::to_string));
    let (start_date, end_date) = resolve_dates(candidates, entities);

    StructuredRecord {
        project_title: resolve_title(text, entities),
        department: resolve_department(text, entities),
        region,
        state,
        district: resolve_district(text, entities),
        duration: resolve_duration(text, candidates),
        start_date,
        end_date,
        milestones: resolve_milestones(text),
        estimated_cost,
        fund_allocation: costs.fund_allocation,
        contingency: costs.contingency,
        yearly_budget: costs.yearly_budget,
        num_employees: resolve_headcount(text, candidates),
        machinery: resolve_machinery(candidates),
        raw_materials: resolve_materials(text),
        vendor_details: resolve_vendors(text, entities),
        risk_zone: candidates.first(FieldCategory::RiskZone).map(str::to_string),
        coordinates: resolve_coordinates(text),
        engineering_details: resolve_engineering(text),
        specifications: resolve_specifications(text),
        technical_sections: technical_sections(),
        guidelines_followed: resolve_guidelines(text),
        missing_documents: resolve_missing_documents(text),
    }
}

// ============================================================================
// Title
// ============================================================================

/// Five-strategy title chain, most template-specific first.
pub fn resolve_title(text: &str, entities: &EntityMap) -> Option<String> {
    heading_block_title(text)
        .or_else(|| labeled_title(text))
        .or_else(|| bridge_template_title(text))
        .or_else(|| leading_line_title(text))
        .or_else(|| entities.first(EntityKind::Org).map(str::to_string))
}

/// Title block under a "DETAILED PROJECT REPORT" heading: a "For" marker
/// line, then the title spread over the following lines up to a stop-word
/// line ("In", "Project", "Tentative", "Outlay").
pub fn heading_block_title(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let heading_re = rx::compile(r"(?i)\bdetailed\s+project\s+report\b")?;
    let heading_idx = lines.iter().position(|line| heading_re.is_match(line))?;
    let for_idx = lines
        .iter()
        .enumerate()
        .skip(heading_idx + 1)
        .take(5)
        .find(|(_, line)| line.trim().eq_ignore_ascii_case("for"))
        .map(|(i, _)| i)?;

    let mut collected: Vec<&str> = Vec::new();
    for line in &lines[for_idx + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        let leading = trimmed
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        if TITLE_STOP_WORDS.contains(&leading.as_str()) {
            break;
        }
        collected.push(trimmed);
    }
    if collected.is_empty() {
        return None;
    }
    let title = strip_artifact_suffix(&collapse_ws(&collected.join(" ")));
    (title.chars().count() > 3).then_some(title)
}

/// Strip artifact suffixes that OCR glues onto heading-block titles: a
/// trailing parenthetical acronym, optionally preceded by "Application".
pub fn strip_artifact_suffix(title: &str) -> String {
    let mut out = title.trim().to_string();
    if let Some(re) = rx::compile(r"\s*(?:Application\s*)?\([A-Za-z]{2,10}\)$") {
        out = re.replace(&out, "").trim().to_string();
    }
    if let Some(re) = rx::compile(r"\s+Application$") {
        out = re.replace(&out, "").trim().to_string();
    }
    out
}

/// Labeled "Project Title:" / "Name of the Project:" line.
pub fn labeled_title(text: &str) -> Option<String> {
    let re = rx::compile(
        r"(?i)(?:Project\s*Title|Name\s*of\s*(?:the\s*)?Project)[:\-]\s*([^\n]{5,200})",
    )?;
    let caps = re.captures(text)?;
    plausible_title(caps.get(1)?.as_str())
}

/// Section-heading patterns from the bridge-style template.
pub fn bridge_template_title(text: &str) -> Option<String> {
    for pattern in [
        r"3\.1\.1\s+Project Definition[^\n]*\n[^\n]*\n([^\n]{5,200})",
        r"(?m)^Project[:\-]\s*([A-Z][^\n]{3,200})",
    ] {
        let candidate = rx::compile(pattern)
            .and_then(|re| re.captures(text).and_then(|caps| caps.get(1).map(|g| g.as_str().to_string())))
            .and_then(|raw| plausible_title(&raw));
        if candidate.is_some() {
            return candidate;
        }
    }
    None
}

/// First line within the first 25 lines that names a project-domain word
/// and is not boilerplate.
pub fn leading_line_title(text: &str) -> Option<String> {
    let domain = rx::compile(r"(?i)\b(?:project|scheme|road|bridge|development|construction)\b")?;
    let boilerplate = rx::compile(r"(?i)\b(?:template|sample|logo|page|draft)\b")?;
    text.lines().take(25).find_map(|line| {
        let line = line.trim();
        (line.chars().count() > 6 && !boilerplate.is_match(line) && domain.is_match(line))
            .then(|| line.to_string())
    })
}

fn plausible_title(raw: &str) -> Option<String> {
    let title = collapse_ws(raw);
    if title.chars().count() <= 4 {
        return None;
    }
    let lower = title.to_lowercase();
    if ["template", "sample", "model"]
        .iter()
        .any(|word| lower.contains(word))
    {
        return None;
    }
    Some(title)
}

// ============================================================================
// Department
// ============================================================================

pub fn resolve_department(text: &str, entities: &EntityMap) -> Option<String> {
    if let Some(re) = rx::compile(
        r"(?i)(?:Prepared\s*(?:/\s*Submitted\s*)?by|Department|Ministry)[:\-]\s*([^\n]{3,200})",
    ) {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(collapse_ws(group.as_str()));
        }
    }
    let lower = text.to_lowercase();
    for dept in KNOWN_DEPARTMENTS {
        if lower.contains(&dept.to_lowercase()) {
            return Some(dept.to_string());
        }
    }
    if let Some(re) = rx::compile(r"Ministry of [A-Z][^\n,]*") {
        if let Some(m) = re.find(text) {
            return Some(collapse_ws(m.as_str()));
        }
    }
    let keyword = rx::compile(r"(?i)\b(?:department|ministry|authority|board)\b")?;
    entities
        .kind(EntityKind::Org)
        .iter()
        .find(|org| keyword.is_match(org))
        .cloned()
}

// ============================================================================
// Cost family
// ============================================================================

/// The four cost-family fields drawn from budget candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostPositions {
    pub estimated_cost: Option<String>,
    pub fund_allocation: Option<String>,
    pub contingency: Option<String>,
    pub yearly_budget: Option<String>,
}

/// Positional convention over budget-like matches, preserved exactly for
/// compatibility with existing consumers: in candidate order the first
/// match is the estimated cost, and the second, third, and fourth are fund
/// allocation, contingency, and yearly budget. This function is the
/// convention's only home — change it here or not at all.
pub fn cost_positions(candidates: &CandidateSet) -> CostPositions {
    let nth = |index| {
        candidates
            .nth(FieldCategory::Budget, index)
            .map(str::to_string)
    };
    CostPositions {
        estimated_cost: nth(0),
        fund_allocation: nth(1),
        contingency: nth(2),
        yearly_budget: nth(3),
    }
}

/// Direct labeled-cost match, tried before the positional convention.
pub fn labeled_cost(text: &str) -> Option<String> {
    if let Some(re) = rx::compile(
        r"(?i)(?:Total Project Cost|Estimated Cost|Project Tentative Outlay|Outlay|Project Cost)[:\-]?\s*([₹Rs$€£.\s,0-9]+(?:crore|lakh|million|billion)?)",
    ) {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            let amount = group.as_str().trim();
            // Template placeholder amounts ("XXXX") are not values.
            let is_placeholder = rx::compile(r"^[Xx]+$").map_or(false, |re| re.is_match(amount));
            if !amount.is_empty() && !is_placeholder {
                return Some(amount.to_string());
            }
        }
    }
    if let Some(re) = rx::compile(r"[₹Rs$€£]\s*[\d,]+(?:\.\d+)?") {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    rx::compile(r"(?i)[\d,.]+\s*(?:lakh|crore|million|billion)")
        .and_then(|re| re.find(text).map(|m| m.as_str().trim().to_string()))
}

// ============================================================================
// Timeline
// ============================================================================

/// Pattern dates then entity dates, concatenated; first two become the
/// start and end dates.
pub fn resolve_dates(
    candidates: &CandidateSet,
    entities: &EntityMap,
) -> (Option<String>, Option<String>) {
    let mut all: Vec<&str> = candidates.texts(FieldCategory::Date).collect();
    all.extend(entities.kind(EntityKind::Date).iter().map(String::as_str));
    (
        all.first().map(|d| d.to_string()),
        all.get(1).map(|d| d.to_string()),
    )
}

pub fn resolve_duration(text: &str, candidates: &CandidateSet) -> Option<String> {
    if let Some(re) = rx::compile(
        r"(?i)(?:Project Duration|Duration|Timeline)[:\-]?\s*(\d{1,3}\s*(?:months?|years?))",
    ) {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(group.as_str().trim().to_string());
        }
    }
    if let Some(re) = rx::compile(r"(?i)\b(\d{1,3}\s*(?:months?|years?))\b") {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(group.as_str().trim().to_string());
        }
    }
    candidates
        .first(FieldCategory::Duration)
        .map(str::to_string)
}

pub fn resolve_milestones(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    if let Some(re) = rx::compile(r"(?i)Milestone[:\-]\s*([^\n]+)") {
        for caps in re.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                found.push(collapse_ws(group.as_str()));
            }
        }
    }
    if let Some(re) = rx::compile(r"(?m)^\s*[-•]\s*([A-Za-z][A-Za-z ]{3,99})") {
        for caps in re.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                let item = group.as_str().trim().to_string();
                if !found.contains(&item) {
                    found.push(item);
                }
            }
        }
    }
    let lower = text.to_lowercase();
    for keyword in [
        "site preparation",
        "foundation",
        "structural",
        "finishing",
        "handover",
        "completion",
        "procurement",
        "implementation",
    ] {
        let titled = title_case(keyword);
        if lower.contains(keyword) && !found.contains(&titled) {
            found.push(titled);
        }
    }
    if found.is_empty() {
        return vec![
            "Site Preparation".to_string(),
            "Construction".to_string(),
            "Completion".to_string(),
        ];
    }
    found
}

// ============================================================================
// Geography
// ============================================================================

pub fn resolve_state(text: &str, entities: &EntityMap) -> Option<String> {
    if let Some(re) = rx::compile(r"(?i)\bState\s*[:\-]\s*([^\n,]+)") {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(collapse_ws(group.as_str()));
        }
    }
    for state in STATE_GAZETTEER {
        if let Some(re) = rx::compile(&format!(r"(?i)\b{state}\b")) {
            if re.is_match(text) {
                return Some(state.to_string());
            }
        }
    }
    entities
        .kind(EntityKind::Place)
        .iter()
        .find(|place| {
            STATE_GAZETTEER
                .iter()
                .any(|state| state.eq_ignore_ascii_case(place))
        })
        .cloned()
}

pub fn resolve_district(text: &str, entities: &EntityMap) -> Option<String> {
    if let Some(re) = rx::compile(r"(?i)\bDistrict\s*[:\-]\s*([^\n,]+)") {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(collapse_ws(group.as_str()));
        }
    }
    // Shortest place span that is not state-like.
    let state_like = rx::compile(r"(?i)\b(?:state|province|country)\b")?;
    entities
        .kind(EntityKind::Place)
        .iter()
        .filter(|place| {
            place.chars().count() < 30
                && !state_like.is_match(place)
                && !STATE_GAZETTEER
                    .iter()
                    .any(|state| state.eq_ignore_ascii_case(place))
        })
        .min_by_key(|place| place.chars().count())
        .cloned()
}

pub fn resolve_coordinates(text: &str) -> Option<String> {
    if let Some(re) = rx::compile(
        r"(-?\d{1,3}\.\d+)\s*[°,]?\s*([NSns])?[,;\s]+(-?\d{1,3}\.\d+)\s*[°,]?\s*([EeWw])?",
    ) {
        if let Some(caps) = re.captures(text) {
            let lat = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let lon = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let lat_dir = caps
                .get(2)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_default();
            let lon_dir = caps
                .get(4)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_default();
            if !lat.is_empty() && !lon.is_empty() {
                return Some(if lat_dir.is_empty() && lon_dir.is_empty() {
                    format!("{lat}, {lon}")
                } else {
                    format!("{lat}{lat_dir}, {lon}{lon_dir}")
                });
            }
        }
    }
    rx::compile(r"(\d{1,3}\.\d+)\s*[,;]\s*(\d{1,3}\.\d+)")
        .and_then(|re| re.captures(text).map(|caps| format!("{}, {}", &caps[1], &caps[2])))
}

// ============================================================================
// Resources
// ============================================================================

/// Labeled headcount match; numeric parse failures resolve to absent.
pub fn resolve_headcount(text: &str, candidates: &CandidateSet) -> Option<u32> {
    if let Some(re) = rx::compile(r"(?i)(?:Number of Employees|Manpower)[:\-]\s*(\d+)") {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            if let Ok(n) = group.as_str().parse() {
                return Some(n);
            }
        }
    }
    let raw = candidates.first(FieldCategory::EmployeeCount)?;
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub fn resolve_machinery(candidates: &CandidateSet) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for text in candidates.texts(FieldCategory::Equipment) {
        let titled = title_case(text);
        if seen.insert(titled.clone()) {
            out.push(titled);
        }
    }
    out
}

pub fn resolve_materials(text: &str) -> Vec<String> {
    MATERIAL_LEXICON
        .iter()
        .filter(|material| {
            rx::compile(&format!(r"(?i)\b{}\b", regex::escape(material)))
                .map_or(false, |re| re.is_match(text))
        })
        .map(|material| title_case(material))
        .collect()
}

pub fn resolve_vendors(text: &str, entities: &EntityMap) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(re) = rx::compile(r"(?i)(?:vendor|contractor|supplier)[:\-]\s*([^\n,]+)") {
        for caps in re.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                out.push(collapse_ws(group.as_str()));
            }
        }
    }
    if let Some(government) = rx::compile(r"(?i)\b(?:department|ministry|government|authority)\b") {
        for org in entities.kind(EntityKind::Org) {
            if !government.is_match(org) {
                out.push(org.clone());
            }
        }
    }
    let mut seen = BTreeSet::new();
    out.retain(|vendor| seen.insert(vendor.clone()));
    out
}

// ============================================================================
// Technical & compliance
// ============================================================================

pub fn resolve_engineering(text: &str) -> Option<String> {
    if let Some(re) = rx::compile(
        r"(?i)(?:TECHNICAL SPECIFICATIONS|TECHNICAL DETAILS|ENGINEERING DETAILS)[:\-]?\s*([^\n]{10,1000})",
    ) {
        if let Some(group) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(group.as_str().trim().to_string());
        }
    }
    let sentence_break = rx::compile(r"[.!?]\s+")?;
    let keyword =
        rx::compile(r"(?i)\b(?:design|foundation|pavement|drainage|embankment|superstructure)\b")?;
    let result = sentence_break
        .split(text)
        .find(|sentence| keyword.is_match(sentence))
        .map(|sentence| collapse_ws(sentence));
    result
}

pub fn resolve_specifications(text: &str) -> Option<String> {
    let mapping = [
        (r"(?i)Road Length[:\-]\s*([^\n]+)", "Length"),
        (r"(?i)Road Width[:\-]\s*([^\n]+)", "Width"),
        (r"(?i)(?:Surface Material|Surface)[:\-]\s*([^\n]+)", "Surface"),
        (r"(?i)Drainage System[:\-]\s*([^\n]+)", "Drainage"),
    ];
    let mut specs = Vec::new();
    for (pattern, label) in mapping {
        if let Some(group) = rx::compile(pattern)
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps.get(1).map(|g| collapse_ws(g.as_str())))
        {
            specs.push(format!("{label}: {group}"));
        }
    }
    if !specs.is_empty() {
        return Some(specs.join("; "));
    }
    rx::compile(r"(?i)(?:specifications?|standard)[:\-]\s*([^\n]+)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1).map(|g| collapse_ws(g.as_str())))
}

pub fn resolve_guidelines(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    COMPLIANCE_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
        .then_some(true)
}

pub fn resolve_missing_documents(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for pattern in [
        r"(?i)(?:missing|lacking|absent)[:\-]?\s*([^\n.!?]+)",
        r"(?i)(?:no|without)\s+([^\n.!?]+document)",
    ] {
        if let Some(re) = rx::compile(pattern) {
            for caps in re.captures_iter(text) {
                if let Some(group) = caps.get(1) {
                    out.push(collapse_ws(group.as_str()));
                }
            }
        }
    }
    out
}

pub fn technical_sections() -> Vec<String> {
    vec![
        "Introduction".to_string(),
        "Methodology".to_string(),
        "Implementation".to_string(),
    ]
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
