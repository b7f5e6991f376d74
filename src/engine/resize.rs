//! Width-change resolver
//!
//! Applies a committed width edit under sync/pair/lock policy. Resolution
//! order is fixed: the sync branch wins when the unit's sync group has at
//! least two selected members, the pair branch follows, and a lone unit
//! resolves through its own lock state. Every branch validates the complete
//! multi-unit edit before mutating anything, so a rejection leaves the scene
//! untouched.

use tracing::debug;

use crate::catalog::{width_limits, ProductCatalog};
use crate::model::{Scene, Unit, UnitId};

use super::config::EngineConfig;
use super::error::ResizeRejection;
use super::propagate::{propagate, ChangeFlags};

/// Outcome of an applied width edit
#[derive(Debug, Clone, PartialEq)]
pub struct WidthApplied {
    pub unit: UnitId,
    pub previous: f64,
    pub width: f64,
    /// Other units whose position changed as part of the edit
    pub repositioned: Vec<UnitId>,
}

/// Resolved single-unit edit, computed before any mutation
struct LockPlan {
    unit: UnitId,
    previous: f64,
    width: f64,
    new_x: f64,
    /// Shift applied to same-view units strictly left of the original span
    left_shift: f64,
    /// Shift applied to same-view units strictly right of the original span
    right_shift: f64,
    orig_left: f64,
    orig_right: f64,
    view: Option<String>,
    pair_group: Option<String>,
}

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > 1e-9
}

/// Apply a requested width to a unit, honoring group and lock policy
pub fn resize_width(
    scene: &mut Scene,
    catalog: &dyn ProductCatalog,
    unit_id: &UnitId,
    requested: f64,
    config: &EngineConfig,
) -> Result<WidthApplied, ResizeRejection> {
    let unit = scene
        .get(unit_id)
        .cloned()
        .ok_or_else(|| ResizeRejection::UnknownUnit(unit_id.clone()))?;

    if !differs(unit.width, requested) {
        return Ok(WidthApplied {
            unit: unit.id,
            previous: requested,
            width: requested,
            repositioned: vec![],
        });
    }

    // Sync wins over pair when both memberships exist; the pair branch is
    // only reached when the sync branch does not apply.
    if let Some(group) = unit.sync_group.clone() {
        if scene.selected_sync_count(&group) >= 2 {
            return resize_sync_group(scene, catalog, &unit, &group, requested, config);
        }
    }

    if let Some(pair) = unit.pair.clone() {
        return resize_pair_group(scene, catalog, &unit, &pair.group, requested, config);
    }

    let plan = plan_lock_resize(scene, catalog, unit_id, requested, config)?;
    Ok(apply_lock_plan(scene, plan, config))
}

/// Resolve one unit through its lock state without mutating anything
fn plan_lock_resize(
    scene: &Scene,
    catalog: &dyn ProductCatalog,
    unit_id: &UnitId,
    requested: f64,
    config: &EngineConfig,
) -> Result<LockPlan, ResizeRejection> {
    let unit = scene
        .get(unit_id)
        .ok_or_else(|| ResizeRejection::UnknownUnit(unit_id.clone()))?;

    if unit.left_lock && unit.right_lock {
        return Err(ResizeRejection::lock_conflict(unit.id.clone()));
    }

    let (min, max) = width_limits(catalog, unit, config);
    if requested < min - 1e-9 || requested > max + 1e-9 {
        return Err(ResizeRejection::out_of_range(
            unit.id.clone(),
            requested,
            min,
            max,
        ));
    }

    let delta = requested - unit.width;
    let (new_x, left_shift, right_shift) = if unit.left_lock {
        // left edge fixed, right edge absorbs the whole delta
        (unit.position.x, 0.0, delta)
    } else if unit.right_lock {
        // right edge fixed, left edge absorbs the whole delta
        (unit.position.x - delta, -delta, 0.0)
    } else {
        // center fixed, each edge absorbs half
        (unit.position.x - delta / 2.0, -delta / 2.0, delta / 2.0)
    };

    // Left-wall overflow: simulate the leftward push against the unit itself
    // and every other non-paired same-view unit ahead of it. The right side
    // never rejects; it auto-adjusts.
    let mut lowest_left = new_x;
    if left_shift < 0.0 {
        if let Some(view) = &unit.view {
            for other in scene.units_in_view(view) {
                if other.id == unit.id || !other.is_snap_target() {
                    continue;
                }
                if same_pair_group(unit, other) {
                    continue;
                }
                if other.right_edge() <= unit.left_edge() + 1e-9 {
                    lowest_left = lowest_left.min(other.left_edge() + left_shift);
                }
            }
        }
    }
    if lowest_left < -1e-9 {
        return Err(ResizeRejection::wall_overflow(unit.id.clone(), -lowest_left));
    }

    Ok(LockPlan {
        unit: unit.id.clone(),
        previous: unit.width,
        width: requested,
        new_x,
        left_shift,
        right_shift,
        orig_left: unit.left_edge(),
        orig_right: unit.right_edge(),
        view: unit.view.clone(),
        pair_group: unit.pair.as_ref().map(|p| p.group.clone()),
    })
}

fn same_pair_group(unit: &Unit, other: &Unit) -> bool {
    match (&unit.pair, &other.pair) {
        (Some(a), Some(b)) => a.group == b.group,
        _ => false,
    }
}

/// Mutate the scene per a validated plan and ripple the same-view row
fn apply_lock_plan(scene: &mut Scene, plan: LockPlan, config: &EngineConfig) -> WidthApplied {
    let mut repositioned = Vec::new();

    let moved = match scene.get_mut(&plan.unit) {
        Some(unit) => {
            let moved = differs(unit.position.x, plan.new_x);
            unit.width = plan.width;
            unit.position.x = plan.new_x;
            moved
        }
        None => {
            return WidthApplied {
                unit: plan.unit,
                previous: plan.previous,
                width: plan.previous,
                repositioned,
            }
        }
    };

    let mut flags = ChangeFlags::width();
    flags.position = moved;
    propagate(scene, &plan.unit, flags, config);
    debug!(unit = %plan.unit, width = plan.width, "width applied");

    if let Some(view) = &plan.view {
        let shifts: Vec<(UnitId, f64)> = scene
            .units_in_view(view)
            .iter()
            .filter(|o| o.id != plan.unit && o.is_snap_target())
            .filter(|o| {
                plan.pair_group.as_deref().is_none()
                    || o.pair.as_ref().map(|p| p.group.as_str()) != plan.pair_group.as_deref()
            })
            .filter_map(|o| {
                if differs(plan.right_shift, 0.0) && o.left_edge() >= plan.orig_right - 1e-9 {
                    Some((o.id.clone(), plan.right_shift))
                } else if differs(plan.left_shift, 0.0) && o.right_edge() <= plan.orig_left + 1e-9 {
                    Some((o.id.clone(), plan.left_shift))
                } else {
                    None
                }
            })
            .collect();

        for (id, shift) in shifts {
            let moved_by = match scene.get_mut(&id) {
                Some(other) => {
                    let clamped = (other.position.x + shift).max(0.0);
                    let moved_by = clamped - other.position.x;
                    other.position.x = clamped;
                    moved_by
                }
                None => continue,
            };
            if moved_by.abs() > config.epsilon {
                propagate(scene, &id, ChangeFlags::position(), config);
                repositioned.push(id);
            }
        }
    }

    WidthApplied {
        unit: plan.unit,
        previous: plan.previous,
        width: plan.width,
        repositioned,
    }
}

/// Pair branch: distribute the delta by weight, each member resolved through
/// its own lock state; the whole edit validates before anything mutates.
fn resize_pair_group(
    scene: &mut Scene,
    catalog: &dyn ProductCatalog,
    unit: &Unit,
    group: &str,
    requested: f64,
    config: &EngineConfig,
) -> Result<WidthApplied, ResizeRejection> {
    let delta = requested - unit.width;

    let shares: Vec<(UnitId, f64)> = scene
        .pair_members(group)
        .iter()
        .filter(|m| m.id != unit.id)
        .map(|m| {
            let weight = m.pair.as_ref().map(|p| p.weight).unwrap_or(0.0);
            (m.id.clone(), m.width + delta * weight / 100.0)
        })
        .collect();

    let mut plans = vec![plan_lock_resize(scene, catalog, &unit.id, requested, config)?];
    for (member_id, target) in &shares {
        let member = scene
            .get(member_id)
            .ok_or_else(|| ResizeRejection::UnknownUnit(member_id.clone()))?;
        if !differs(member.width, *target) {
            continue;
        }
        plans.push(plan_lock_resize(scene, catalog, member_id, *target, config)?);
    }

    let mut repositioned = Vec::new();
    let mut first: Option<WidthApplied> = None;
    for plan in plans {
        let applied = apply_lock_plan(scene, plan, config);
        if first.is_none() {
            first = Some(applied.clone());
        } else {
            repositioned.push(applied.unit.clone());
        }
        repositioned.extend(applied.repositioned);
    }

    let mut result = first.unwrap_or(WidthApplied {
        unit: unit.id.clone(),
        previous: unit.width,
        width: unit.width,
        repositioned: vec![],
    });
    result.repositioned = repositioned;
    Ok(result)
}

/// Sync branch: equal-and-opposite distribution across the other selected
/// members, then an edge-to-edge re-pack of the whole group.
fn resize_sync_group(
    scene: &mut Scene,
    catalog: &dyn ProductCatalog,
    unit: &Unit,
    group: &str,
    requested: f64,
    config: &EngineConfig,
) -> Result<WidthApplied, ResizeRejection> {
    let delta = requested - unit.width;

    let member_ids: Vec<UnitId> = scene.sync_members(group).iter().map(|m| m.id.clone()).collect();
    let selected: Vec<UnitId> = member_ids
        .iter()
        .filter(|id| scene.is_selected(id))
        .cloned()
        .collect();
    let share = -delta / (selected.len() as f64 - 1.0);

    // validate every member's resulting width before mutating anything
    let mut targets: Vec<(UnitId, f64)> = Vec::new();
    for id in &member_ids {
        let member = scene
            .get(id)
            .ok_or_else(|| ResizeRejection::UnknownUnit(id.clone()))?;
        let target = if *id == unit.id {
            requested
        } else if selected.contains(id) {
            member.width + share
        } else {
            member.width
        };
        let (min, max) = width_limits(catalog, member, config);
        if target < min - 1e-9 || target > max + 1e-9 {
            return Err(ResizeRejection::out_of_range(id.clone(), target, min, max));
        }
        targets.push((id.clone(), target));
    }

    // record original effective lefts before any mutation
    let mut original_lefts: Vec<(UnitId, f64)> = Vec::new();
    for id in &member_ids {
        let left = scene
            .effective_extent(id)
            .map(|e| e.left)
            .unwrap_or_default();
        original_lefts.push((id.clone(), left));
    }

    let mut width_changed: Vec<UnitId> = Vec::new();
    for (id, target) in &targets {
        if let Some(member) = scene.get_mut(id) {
            if differs(member.width, *target) {
                member.width = *target;
                width_changed.push(id.clone());
            }
        }
    }

    // re-pack edge-to-edge from the leftmost member's original effective
    // left, clamped so no left edge crosses the wall
    let mut order = original_lefts.clone();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut cursor = order
        .first()
        .map(|(_, left)| left.max(0.0))
        .unwrap_or(0.0);

    let mut moved: Vec<UnitId> = Vec::new();
    for (id, _) in &order {
        let Some(eff) = scene.effective_extent(id) else {
            continue;
        };
        let eff_width = eff.width();
        if let Some(member) = scene.get_mut(id) {
            let offset = member.position.x - eff.left;
            let new_x = cursor + offset;
            if differs(member.position.x, new_x) {
                member.position.x = new_x;
                moved.push(id.clone());
            }
        }
        cursor += eff_width;
    }

    for id in &member_ids {
        let mut flags = ChangeFlags::default();
        flags.width = width_changed.contains(id);
        flags.position = moved.contains(id);
        if flags.any() {
            propagate(scene, id, flags, config);
        }
    }
    debug!(group, delta, members = member_ids.len(), "sync group resized");

    let repositioned: Vec<UnitId> = member_ids
        .iter()
        .filter(|id| **id != unit.id && (width_changed.contains(id) || moved.contains(id)))
        .cloned()
        .collect();

    Ok(WidthApplied {
        unit: unit.id.clone(),
        previous: unit.width,
        width: requested,
        repositioned,
    })
}
