//! Typed attribute maps for resource capability matching.
//!
//! Requests declare required attributes (e.g. `projector = true`,
//! `lab_type = "chemistry"`); resources declare what they offer. Matching
//! is exact: every required key must be present on the resource with an
//! equal value. A closed tagged value type keeps the map extensible
//! without reflection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Free-form string value (e.g. `"chemistry"`).
    Str(String),
    /// Integer value (e.g. seat rows, outlet count).
    Int(i64),
    /// Boolean capability flag.
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An ordered key → value attribute map.
///
/// Ordering is lexicographic by key so that iteration, serialization,
/// and anything derived from them is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, AttrValue>);

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder: inserts an attribute and returns self.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up an attribute value.
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    /// Whether this map satisfies a requirement map.
    ///
    /// Every required key must be present here with an equal value.
    /// An empty requirement map is satisfied unconditionally.
    pub fn satisfies(&self, required: &AttributeMap) -> bool {
        required.0.iter().all(|(key, value)| self.0.get(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_requirements_always_satisfied() {
        let offered = AttributeMap::new().with("projector", true);
        assert!(offered.satisfies(&AttributeMap::new()));
        assert!(AttributeMap::new().satisfies(&AttributeMap::new()));
    }

    #[test]
    fn test_satisfies_own_map() {
        let offered = AttributeMap::new()
            .with("projector", true)
            .with("lab_type", "chemistry")
            .with("outlets", 24_i64);
        assert!(offered.satisfies(&offered.clone()));
    }

    #[test]
    fn test_missing_key_never_satisfied() {
        let offered = AttributeMap::new().with("projector", true);
        let required = AttributeMap::new().with("smart_board", true);
        assert!(!offered.satisfies(&required));
    }

    #[test]
    fn test_value_mismatch() {
        let offered = AttributeMap::new().with("lab_type", "chemistry");
        let required = AttributeMap::new().with("lab_type", "physics");
        assert!(!offered.satisfies(&required));

        // Same key, different variant
        let required_bool = AttributeMap::new().with("lab_type", true);
        assert!(!offered.satisfies(&required_bool));
    }

    #[test]
    fn test_subset_satisfied() {
        let offered = AttributeMap::new()
            .with("projector", true)
            .with("lab_type", "chemistry");
        let required = AttributeMap::new().with("projector", true);
        assert!(offered.satisfies(&required));
    }

    #[test]
    fn test_serde_round_trip() {
        let map = AttributeMap::new()
            .with("projector", true)
            .with("outlets", 12_i64)
            .with("lab_type", "chemistry");

        let json = serde_json::to_string(&map).unwrap();
        let back: AttributeMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
        assert_eq!(back.get("outlets"), Some(&AttrValue::Int(12)));
        assert_eq!(back.get("projector"), Some(&AttrValue::Bool(true)));
    }
}
