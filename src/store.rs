//! Persisted per-unit state: dimension overrides and material color
//!
//! The store keeps the non-geometric state a unit carries between sessions.
//! The formula engine reads and writes dimension values through it; geometry
//! stays on the `Unit` itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::UnitId;

/// Stored state for one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    /// Dimension id -> persisted override value
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_color: Option<String>,
}

/// Keyed persistence of per-unit state
pub trait StateStore {
    fn get(&self, unit: &UnitId) -> Option<&UnitState>;
    fn set(&mut self, unit: &UnitId, state: UnitState);

    /// A single persisted dimension value, if present
    fn value(&self, unit: &UnitId, dimension: &str) -> Option<f64> {
        self.get(unit).and_then(|s| s.values.get(dimension).copied())
    }

    /// Write one dimension value, preserving the rest of the unit's state
    fn set_value(&mut self, unit: &UnitId, dimension: &str, value: f64) {
        let mut state = self.get(unit).cloned().unwrap_or_default();
        state.values.insert(dimension.to_string(), value);
        self.set(unit, state);
    }
}

/// In-memory store; serializes to TOML for snapshot persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    states: BTreeMap<String, UnitState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, unit: &UnitId) -> Option<&UnitState> {
        self.states.get(unit.as_str())
    }

    fn set(&mut self, unit: &UnitId, state: UnitState) {
        self.states.insert(unit.as_str().to_string(), state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_preserves_other_state() {
        let mut store = MemoryStore::new();
        let unit = UnitId::new("b1");

        store.set(
            &unit,
            UnitState {
                values: BTreeMap::from([("shelf_count".to_string(), 2.0)]),
                material_color: Some("oak".to_string()),
            },
        );
        store.set_value(&unit, "width", 650.0);

        let state = store.get(&unit).unwrap();
        assert_eq!(state.values.get("width"), Some(&650.0));
        assert_eq!(state.values.get("shelf_count"), Some(&2.0));
        assert_eq!(state.material_color.as_deref(), Some("oak"));
    }

    #[test]
    fn test_missing_unit_yields_none() {
        let store = MemoryStore::new();
        assert!(store.get(&UnitId::new("ghost")).is_none());
        assert!(store.value(&UnitId::new("ghost"), "width").is_none());
    }

    #[test]
    fn test_set_value_creates_state() {
        let mut store = MemoryStore::new();
        let unit = UnitId::new("b1");
        store.set_value(&unit, "depth", 560.0);
        assert_eq!(store.value(&unit, "depth"), Some(560.0));
    }
}
