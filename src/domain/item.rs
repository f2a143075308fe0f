//! Node payload: identity, display name, rank and scores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::course::{DegreeCourse, Level};
use crate::domain::error::DomainResult;
use crate::domain::estimation::{null_as_default, EstimationEntry, EstimationSet};

pub const DEFAULT_DESCRIPTION: &str = "No Description";

/// Payload carried by every taxonomy node.
///
/// An empty `id` means "not supplied yet"; the owning tree assigns one when
/// the item is inserted or reconstructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub level: Level,
    #[serde(rename = "degrees", default, deserialize_with = "null_as_default")]
    pub estimations: EstimationSet,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl TaxonomyItem {
    /// Item with a zero score for every course and no id yet.
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        Self::with_id("", name, level)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, level: Level) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            estimations: EstimationSet::seeded(),
            description: default_description(),
        }
    }

    /// Default-seeded item whose entry for `entry.degree_course` is replaced.
    pub fn with_estimation(
        name: impl Into<String>,
        level: Level,
        entry: EstimationEntry,
        description: impl Into<String>,
    ) -> Self {
        let mut item = Self::new(name, level);
        item.estimations.upsert(entry);
        item.description = description.into();
        item
    }

    pub fn with_estimations(
        name: impl Into<String>,
        level: Level,
        estimations: EstimationSet,
    ) -> Self {
        Self {
            estimations,
            ..Self::new(name, level)
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get_estimation_by_course(&self, course: DegreeCourse) -> Option<&EstimationEntry> {
        self.estimations.get(course)
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for TaxonomyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_item_then_unassigned_id_and_default_description() {
        let item = TaxonomyItem::new("Design", Level::L1);
        assert!(!item.has_id());
        assert_eq!(item.description, DEFAULT_DESCRIPTION);
        assert_eq!(item.estimations.len(), 9);
        assert_eq!(item.to_string(), "Design");
    }

    #[test]
    fn given_single_estimation_then_replaces_seeded_entry() {
        let item = TaxonomyItem::with_estimation(
            "Rust",
            Level::L3,
            EstimationEntry::new(DegreeCourse::SE, 4.0),
            "systems programming",
        );
        assert_eq!(item.estimations.len(), 9);
        assert_eq!(item.estimations.value(DegreeCourse::SE), Some(4.0));
        assert_eq!(item.description, "systems programming");
    }

    #[test]
    fn given_json_with_null_degrees_then_reads_empty_set() {
        let json = r#"{"id":"000000","name":"root","level":"Root","degrees":null,"description":"The root node"}"#;
        let item: TaxonomyItem = serde_json::from_str(json).unwrap();
        assert!(item.estimations.is_empty());
        assert_eq!(item.level, Level::Root);
    }

    #[test]
    fn given_item_when_to_json_then_uses_wire_field_names() {
        let item = TaxonomyItem::with_id("abc123", "Design", Level::L1);
        let json = item.to_json().unwrap();
        assert!(json.contains(r#""degrees":["#));
        assert!(json.contains(r#""level":"L1""#));
        assert!(json.contains(r#""id":"abc123""#));
    }
}
