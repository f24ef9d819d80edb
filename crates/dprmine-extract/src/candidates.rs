//! Candidate model shared by the pattern and entity stages.
//!
//! Both stages produce *candidates*: matched spans proposed for a field
//! before resolution. Order is semantically meaningful everywhere in this
//! module — the first candidate in a category came from the most specific
//! pattern tier, and the resolution stage indexes into that order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic field categories matched by the pattern stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldCategory {
    Budget,
    Date,
    Duration,
    Location,
    RiskZone,
    EmployeeCount,
    Equipment,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 7] = [
        FieldCategory::Budget,
        FieldCategory::Date,
        FieldCategory::Duration,
        FieldCategory::Location,
        FieldCategory::RiskZone,
        FieldCategory::EmployeeCount,
        FieldCategory::Equipment,
    ];
}

/// Generic entity kinds supplied by the auxiliary entity stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Money,
    Date,
    Place,
    Org,
    Person,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Money,
        EntityKind::Date,
        EntityKind::Place,
        EntityKind::Org,
        EntityKind::Person,
    ];
}

/// Which stage proposed a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateSource {
    Pattern,
    Entity,
}

/// One matched span proposed for a field, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub category: FieldCategory,
    pub text: String,
    pub source: CandidateSource,
    /// Pattern tier that produced the match (0 = most specific).
    pub rank: usize,
}

/// Ordered candidates per category, built fresh per document.
///
/// Immutable once the pattern stage hands it to resolution; the resolution
/// call that receives it is its sole consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    by_category: BTreeMap<FieldCategory, Vec<RawCandidate>>,
}

impl CandidateSet {
    pub fn push(&mut self, candidate: RawCandidate) {
        self.by_category
            .entry(candidate.category)
            .or_default()
            .push(candidate);
    }

    /// All candidates for a category, in insertion order.
    pub fn category(&self, category: FieldCategory) -> &[RawCandidate] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate text at a positional index within a category.
    pub fn nth(&self, category: FieldCategory, index: usize) -> Option<&str> {
        self.category(category).get(index).map(|c| c.text.as_str())
    }

    /// First candidate text for a category.
    pub fn first(&self, category: FieldCategory) -> Option<&str> {
        self.nth(category, 0)
    }

    pub fn texts(&self, category: FieldCategory) -> impl Iterator<Item = &str> {
        self.category(category).iter().map(|c| c.text.as_str())
    }

    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Entity spans per kind, ordered by document position.
///
/// When the recognizer capability is absent the map is empty but
/// well-shaped: every kind is present and maps to no spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMap {
    by_kind: BTreeMap<EntityKind, Vec<String>>,
}

impl EntityMap {
    /// The degraded-capability result: every kind present, no spans.
    pub fn empty() -> Self {
        let mut by_kind = BTreeMap::new();
        for kind in EntityKind::ALL {
            by_kind.insert(kind, Vec::new());
        }
        EntityMap { by_kind }
    }

    pub fn push(&mut self, kind: EntityKind, span: impl Into<String>) {
        let span = span.into();
        if span.trim().is_empty() {
            return;
        }
        self.by_kind.entry(kind).or_default().push(span);
    }

    pub fn kind(&self, kind: EntityKind) -> &[String] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, kind: EntityKind) -> Option<&str> {
        self.kind(kind).first().map(String::as_str)
    }

    pub fn total(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_is_preserved() {
        let mut set = CandidateSet::default();
        for (i, text) in ["₹30,00,000", "₹25,00,000", "₹3,00,000"].iter().enumerate() {
            set.push(RawCandidate {
                category: FieldCategory::Budget,
                text: text.to_string(),
                source: CandidateSource::Pattern,
                rank: 1,
            });
            assert_eq!(set.nth(FieldCategory::Budget, i), Some(*text));
        }
        assert_eq!(set.first(FieldCategory::Budget), Some("₹30,00,000"));
        assert_eq!(set.total(), 3);
    }

    #[test]
    fn missing_category_is_an_empty_slice() {
        let set = CandidateSet::default();
        assert!(set.category(FieldCategory::Duration).is_empty());
        assert_eq!(set.first(FieldCategory::Duration), None);
    }

    #[test]
    fn empty_entity_map_has_every_kind() {
        let map = EntityMap::empty();
        for kind in EntityKind::ALL {
            assert!(map.kind(kind).is_empty());
        }
        assert_eq!(map.total(), 0);
    }

    #[test]
    fn blank_entity_spans_are_dropped() {
        let mut map = EntityMap::empty();
        map.push(EntityKind::Org, "   ");
        map.push(EntityKind::Org, "Public Works Department");
        assert_eq!(map.kind(EntityKind::Org).len(), 1);
    }
}
