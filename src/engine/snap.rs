//! Snap & overlap resolver for interactive dragging
//!
//! Computes a corrected position for one dragged unit against its neighbors
//! and optional wall segments. Horizontal and vertical axes snap
//! independently; the nearest candidate within the threshold wins per axis.
//! A composed position that would overlap any candidate discards the whole
//! snap and falls back to the raw pointer target.

use crate::model::{Extent, Scene, Unit, UnitId};

use super::config::EngineConfig;

/// A 2D drag target: x along the wall axis, y vertical
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A wall segment along the axis; its thickness defines left/right edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub x: f64,
    pub thickness: f64,
}

impl WallSegment {
    pub fn new(x: f64, thickness: f64) -> Self {
        Self { x, thickness }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.thickness
    }
}

/// Which pair of edges produced a snap point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    /// Dragged left edge lands on a candidate's right edge
    LeftToRight,
    /// Dragged right edge lands on a candidate's left edge
    RightToLeft,
    BottomToBottom,
    TopToTop,
}

impl SnapKind {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }
}

/// One matched snap point
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    pub kind: SnapKind,
    /// The unit snapped against; `None` for wall segments
    pub against: Option<UnitId>,
    /// The snapped coordinate on this point's axis
    pub at: f64,
    pub distance: f64,
}

/// Result of a snap computation
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub position: Point,
    pub snapped: bool,
    pub points: Vec<SnapPoint>,
}

/// Compute the corrected position for dragging `dragged_id` toward `target`
pub fn compute_snap(
    scene: &Scene,
    dragged_id: &UnitId,
    target: Point,
    walls: &[WallSegment],
    config: &EngineConfig,
) -> SnapResult {
    let raw = SnapResult {
        position: target,
        snapped: false,
        points: vec![],
    };
    let Some(dragged) = scene.get(dragged_id) else {
        return raw;
    };
    let Some(dragged_eff) = scene.effective_extent(dragged_id) else {
        return raw;
    };

    // offsets from the unit's x to its effective edges, stable under movement
    let left_ext = dragged.left_edge() - dragged_eff.left;
    let right_ext = dragged_eff.right - dragged.right_edge();
    let eff_left_t = target.x - left_ext;
    let eff_right_t = target.x + dragged.width + right_ext;

    let candidates: Vec<&Unit> = scene
        .units
        .iter()
        .filter(|u| &u.id != dragged_id && u.is_snap_target())
        .collect();

    let mut best_x: Option<SnapPoint> = None;
    let mut best_y: Option<SnapPoint> = None;

    // nearer wins; an exact tie falls to the smaller displacement, so a unit
    // buried in a neighbor resolves to the closer escape side
    let consider = |slot: &mut Option<SnapPoint>, point: SnapPoint, target_coord: f64| {
        if point.distance > config.snap_threshold {
            return;
        }
        let better = match slot.as_ref() {
            None => true,
            Some(held) => {
                point.distance < held.distance - 1e-9
                    || ((point.distance - held.distance).abs() <= 1e-9
                        && (point.at - target_coord).abs() < (held.at - target_coord).abs())
            }
        };
        if better {
            *slot = Some(point);
        }
    };

    let offer_horizontal = |best_x: &mut Option<SnapPoint>, cand_eff: Extent, against: Option<UnitId>| {
        // dragged right edge to the candidate's left edge; either dragged
        // edge being near that candidate edge keeps the point alive
        let at = cand_eff.left - dragged.width - right_ext;
        let distance = (eff_right_t - cand_eff.left)
            .abs()
            .min((eff_left_t - cand_eff.left).abs());
        consider(
            best_x,
            SnapPoint {
                kind: SnapKind::RightToLeft,
                against: against.clone(),
                at,
                distance,
            },
            target.x,
        );

        // dragged left edge to the candidate's right edge
        let at = cand_eff.right + left_ext;
        let distance = (eff_left_t - cand_eff.right)
            .abs()
            .min((eff_right_t - cand_eff.right).abs());
        consider(
            best_x,
            SnapPoint {
                kind: SnapKind::LeftToRight,
                against,
                at,
                distance,
            },
            target.x,
        );
    };

    for candidate in &candidates {
        let Some(cand_eff) = scene.effective_extent(&candidate.id) else {
            continue;
        };
        offer_horizontal(&mut best_x, cand_eff, Some(candidate.id.clone()));

        let at = candidate.bottom();
        consider(
            &mut best_y,
            SnapPoint {
                kind: SnapKind::BottomToBottom,
                against: Some(candidate.id.clone()),
                at,
                distance: (at - target.y).abs(),
            },
            target.y,
        );
        let at = candidate.top() - dragged.height;
        consider(
            &mut best_y,
            SnapPoint {
                kind: SnapKind::TopToTop,
                against: Some(candidate.id.clone()),
                at,
                distance: (at - target.y).abs(),
            },
            target.y,
        );
    }

    // walls contribute only horizontal edge candidates
    for wall in walls {
        offer_horizontal(&mut best_x, Extent::new(wall.left(), wall.right()), None);
    }

    let position = Point::new(
        best_x.as_ref().map_or(target.x, |p| p.at),
        best_y.as_ref().map_or(target.y, |p| p.at),
    );
    let points: Vec<SnapPoint> = [best_x, best_y].into_iter().flatten().collect();
    if points.is_empty() {
        return raw;
    }

    // composed position must not overlap any candidate; otherwise the whole
    // snap is discarded and the raw target stands
    let placed = Extent::new(
        position.x - left_ext,
        position.x + dragged.width + right_ext,
    );
    let placed_bottom = position.y;
    let placed_top = position.y + dragged.height;
    for candidate in &candidates {
        let Some(cand_eff) = scene.effective_extent(&candidate.id) else {
            continue;
        };
        let horizontal = placed.overlaps(&cand_eff, config.overlap_epsilon);
        let vertical = placed_bottom + config.overlap_epsilon < candidate.top()
            && placed_top - config.overlap_epsilon > candidate.bottom();
        if horizontal && vertical {
            return raw;
        }
    }
    for wall in walls {
        let wall_extent = Extent::new(wall.left(), wall.right());
        if placed.overlaps(&wall_extent, config.overlap_epsilon) {
            return raw;
        }
    }

    SnapResult {
        position,
        snapped: true,
        points,
    }
}
