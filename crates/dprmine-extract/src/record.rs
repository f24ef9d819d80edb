//! The resolved output record.
//!
//! One canonical record; every field may be absent, and absence is a valid,
//! expected state rather than an error. Legacy consumers that predate the
//! canonical layout read aliased keys (`budget`, `timeline`, `location`,
//! `environmental_risks`, `resource_allocation`); those are accessor methods
//! and a serialization view here, never duplicated storage.

use serde::{Deserialize, Serialize};

/// Structured project facts resolved from one report document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecord {
    // Project info
    pub project_title: Option<String>,
    pub department: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,

    // Timeline
    pub duration: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub milestones: Vec<String>,

    // Financial
    pub estimated_cost: Option<String>,
    pub fund_allocation: Option<String>,
    pub contingency: Option<String>,
    pub yearly_budget: Option<String>,

    // Resources
    pub num_employees: Option<u32>,
    pub machinery: Vec<String>,
    pub raw_materials: Vec<String>,
    pub vendor_details: Vec<String>,

    // Risk & geography
    pub risk_zone: Option<String>,
    pub coordinates: Option<String>,

    // Technical & compliance
    pub engineering_details: Option<String>,
    pub specifications: Option<String>,
    pub technical_sections: Vec<String>,
    pub guidelines_followed: Option<bool>,
    pub missing_documents: Vec<String>,
}

impl StructuredRecord {
    /// Legacy alias: `budget` mirrors `estimated_cost`.
    pub fn budget(&self) -> Option<&str> {
        self.estimated_cost.as_deref()
    }

    /// Legacy alias: `timeline` mirrors `duration`.
    pub fn timeline(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    /// Legacy alias: most specific known place, district before state
    /// before region.
    pub fn location(&self) -> Option<&str> {
        self.district
            .as_deref()
            .or(self.state.as_deref())
            .or(self.region.as_deref())
    }

    /// Legacy alias: `environmental_risks` mirrors `risk_zone`.
    pub fn environmental_risks(&self) -> Option<&str> {
        self.risk_zone.as_deref()
    }

    /// Legacy alias: headcount rendered as a string.
    pub fn resource_allocation(&self) -> Option<String> {
        self.num_employees.map(|n| n.to_string())
    }

    /// JSON view carrying the canonical fields plus the legacy alias keys.
    ///
    /// This is the boundary format for consumers still reading the old
    /// duplicated-field layout (risk scoring, report rendering, chatbot).
    pub fn compat_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("budget".into(), json_opt(self.budget()));
            map.insert("timeline".into(), json_opt(self.timeline()));
            map.insert("location".into(), json_opt(self.location()));
            map.insert(
                "environmental_risks".into(),
                json_opt(self.environmental_risks()),
            );
            map.insert(
                "resource_allocation".into(),
                json_opt(self.resource_allocation().as_deref()),
            );
        }
        value
    }

    /// True when nothing at all was recovered from the document.
    pub fn is_all_absent(&self) -> bool {
        *self == StructuredRecord::default()
    }
}

fn json_opt(value: Option<&str>) -> serde_json::Value {
    match value {
        Some(v) => serde_json::Value::String(v.to_string()),
        None => serde_json::Value::Null,
    }
}
