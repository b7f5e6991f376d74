//! Rejection taxonomy for committed edits
//!
//! Rejections are ordinary return values, never panics: every variant is
//! detected before any mutation, so a rejected edit leaves the scene
//! untouched. The `Display` strings double as the user-visible messages.

use thiserror::Error;

use crate::model::UnitId;

/// Why a width edit was refused
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResizeRejection {
    /// Requested width violates the unit's [min, max] range
    #[error("width {requested:.1} for '{unit}' is outside the allowed range [{min:.0}, {max:.0}]")]
    OutOfRange {
        unit: UnitId,
        requested: f64,
        min: f64,
        max: f64,
    },

    /// Both edges locked: nothing can move
    #[error("cannot resize '{unit}': both edges are locked")]
    LockConflict { unit: UnitId },

    /// The edit would push a unit past the left wall boundary
    #[error("edit rejected: '{unit}' would cross the left wall by {overflow:.1}")]
    WallOverflow { unit: UnitId, overflow: f64 },

    /// The edited unit does not exist
    #[error("unknown unit '{0}'")]
    UnknownUnit(UnitId),
}

impl ResizeRejection {
    pub fn out_of_range(unit: impl Into<UnitId>, requested: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            unit: unit.into(),
            requested,
            min,
            max,
        }
    }

    pub fn lock_conflict(unit: impl Into<UnitId>) -> Self {
        Self::LockConflict { unit: unit.into() }
    }

    pub fn wall_overflow(unit: impl Into<UnitId>, overflow: f64) -> Self {
        Self::WallOverflow {
            unit: unit.into(),
            overflow,
        }
    }
}
