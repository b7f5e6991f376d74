//! Configuration for the resolvers and the formula engine

use crate::model::UnitKind;

/// Tunable thresholds and dimensions used across the engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum distance at which a drag snaps to a neighbor edge
    pub snap_threshold: f64,

    /// Tolerance below which a numeric change is not worth applying
    pub epsilon: f64,

    /// Shrink applied to spans before the overlap test so touching edges pass
    pub overlap_epsilon: f64,

    /// Ceiling height, the upper bound soffits fill to
    pub ceiling_height: f64,

    /// Height extension and downward shift applied to closure panels of
    /// overhead units with the door overhang enabled
    pub door_overhang_extension: f64,

    /// How far a worktop projects past its owner's front face
    pub worktop_overhang: f64,

    /// Worktop slab thickness
    pub worktop_thickness: f64,

    /// How far a kicker is recessed behind its owner's front face
    pub kicker_recess: f64,

    /// Thickness of under-panels and soffit return strips
    pub panel_thickness: f64,

    /// Hard cap on formula recalculation passes
    pub max_formula_passes: usize,

    /// Debounce window for formula recalculation triggers, in milliseconds
    pub debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 25.0,
            epsilon: 0.1,
            overlap_epsilon: 0.01,
            ceiling_height: 2400.0,
            door_overhang_extension: 20.0,
            worktop_overhang: 30.0,
            worktop_thickness: 38.0,
            kicker_recess: 50.0,
            panel_thickness: 18.0,
            max_formula_passes: 3,
            debounce_ms: 300,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback width range for a unit kind when no catalog metadata applies
    pub fn width_range(&self, kind: UnitKind) -> (f64, f64) {
        match kind {
            UnitKind::Base => (150.0, 1200.0),
            UnitKind::Tall => (300.0, 1200.0),
            UnitKind::Overhead => (150.0, 1200.0),
            UnitKind::Appliance => (450.0, 920.0),
            UnitKind::Worktop => (100.0, 4000.0),
            UnitKind::Filler => (20.0, 600.0),
            UnitKind::ClosurePanel => (16.0, 100.0),
            UnitKind::Kicker | UnitKind::Soffit | UnitKind::UnderPanel => (10.0, 5000.0),
        }
    }

    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_ceiling_height(mut self, height: f64) -> Self {
        self.ceiling_height = height;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.snap_threshold, 25.0);
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.max_formula_passes, 3);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_snap_threshold(40.0)
            .with_ceiling_height(2700.0);
        assert_eq!(config.snap_threshold, 40.0);
        assert_eq!(config.ceiling_height, 2700.0);
    }

    #[test]
    fn test_width_ranges_per_kind() {
        let config = EngineConfig::default();
        assert_eq!(config.width_range(UnitKind::Base), (150.0, 1200.0));
        assert_eq!(config.width_range(UnitKind::Appliance), (450.0, 920.0));
        assert_eq!(config.width_range(UnitKind::ClosurePanel), (16.0, 100.0));
    }
}
