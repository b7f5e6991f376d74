//! Dependent-component propagator
//!
//! Recomputes every accessory's geometry from its owning unit whenever a
//! relevant attribute changes. Each accessory kind is described by one entry
//! in a rule table: an applicability predicate over the owner's kind, a
//! relevance predicate over the change flags, and a pure compute function
//! from owner state to target geometry. Adding an accessory kind means adding
//! one table entry.
//!
//! Propagation is idempotent (targets are recomputed, never merged, and only
//! written when they differ) and strictly downward, with a single upward
//! exception: a changed filler/closure-panel child re-propagates its owner so
//! that accessories whose width depends on attached children stay fresh.
//! Children cannot own children, so that edge terminates in one hop.

use tracing::debug;

use crate::model::{AccessoryRole, Extent, Position, Scene, Side, Unit, UnitId, UnitKind};

use super::config::EngineConfig;

/// Which owner attributes changed in the triggering edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeFlags {
    pub height: bool,
    pub width: bool,
    pub depth: bool,
    pub position: bool,
    pub kicker_height: bool,
    pub overhang: bool,
    pub child: bool,
}

impl ChangeFlags {
    pub fn width() -> Self {
        Self {
            width: true,
            ..Self::default()
        }
    }

    pub fn height() -> Self {
        Self {
            height: true,
            ..Self::default()
        }
    }

    pub fn depth() -> Self {
        Self {
            depth: true,
            ..Self::default()
        }
    }

    pub fn position() -> Self {
        Self {
            position: true,
            ..Self::default()
        }
    }

    pub fn overhang() -> Self {
        Self {
            overhang: true,
            ..Self::default()
        }
    }

    pub fn child() -> Self {
        Self {
            child: true,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            height: true,
            width: true,
            depth: true,
            position: true,
            kicker_height: true,
            overhang: true,
            child: true,
        }
    }

    pub fn with_position(mut self) -> Self {
        self.position = true;
        self
    }

    pub fn any(&self) -> bool {
        self.height
            || self.width
            || self.depth
            || self.position
            || self.kicker_height
            || self.overhang
            || self.child
    }
}

/// Target geometry computed for an accessory
#[derive(Debug, Clone, Copy, PartialEq)]
struct AccessoryGeometry {
    width: f64,
    height: f64,
    depth: f64,
    position: Position,
}

/// One accessory kind: who owns it, when it reacts, and how it is computed
struct AccessoryRule {
    role: AccessoryRole,
    applicable: fn(UnitKind) -> bool,
    relevant: fn(&ChangeFlags) -> bool,
    compute: fn(&Unit, &Extent, &EngineConfig) -> AccessoryGeometry,
}

fn base_or_tall(kind: UnitKind) -> bool {
    matches!(kind, UnitKind::Base | UnitKind::Tall)
}

fn base_or_appliance(kind: UnitKind) -> bool {
    matches!(kind, UnitKind::Base | UnitKind::Appliance)
}

fn overhead(kind: UnitKind) -> bool {
    matches!(kind, UnitKind::Overhead)
}

fn overhead_or_tall(kind: UnitKind) -> bool {
    matches!(kind, UnitKind::Overhead | UnitKind::Tall)
}

fn span_relevant(flags: &ChangeFlags) -> bool {
    flags.width || flags.position || flags.child
}

fn kicker_relevant(flags: &ChangeFlags) -> bool {
    span_relevant(flags) || flags.kicker_height
}

fn worktop_relevant(flags: &ChangeFlags) -> bool {
    span_relevant(flags) || flags.depth || flags.height
}

fn soffit_relevant(flags: &ChangeFlags) -> bool {
    span_relevant(flags) || flags.height
}

fn compute_kicker(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: eff.width(),
        // the owner's y position is the kicker height
        height: owner.position.y,
        depth: (owner.depth - config.kicker_recess).max(0.0),
        position: Position::new(eff.left, 0.0, owner.position.z),
    }
}

fn compute_worktop(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: eff.width(),
        height: config.worktop_thickness,
        depth: owner.depth + config.worktop_overhang,
        position: Position::new(eff.left, owner.top(), owner.position.z),
    }
}

fn compute_under_panel(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: eff.width(),
        height: config.panel_thickness,
        depth: owner.depth,
        position: Position::new(
            eff.left,
            owner.position.y - config.panel_thickness,
            owner.position.z,
        ),
    }
}

fn compute_soffit(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: eff.width(),
        height: (config.ceiling_height - owner.top()).max(0.0),
        depth: owner.depth,
        position: Position::new(eff.left, owner.top(), owner.position.z),
    }
}

fn compute_soffit_return_left(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: config.panel_thickness,
        height: (config.ceiling_height - owner.top()).max(0.0),
        depth: owner.depth,
        position: Position::new(eff.left, owner.top(), owner.position.z),
    }
}

fn compute_soffit_return_right(owner: &Unit, eff: &Extent, config: &EngineConfig) -> AccessoryGeometry {
    AccessoryGeometry {
        width: config.panel_thickness,
        height: (config.ceiling_height - owner.top()).max(0.0),
        depth: owner.depth,
        position: Position::new(
            eff.right - config.panel_thickness,
            owner.top(),
            owner.position.z,
        ),
    }
}

const RULES: &[AccessoryRule] = &[
    AccessoryRule {
        role: AccessoryRole::Kicker,
        applicable: base_or_tall,
        relevant: kicker_relevant,
        compute: compute_kicker,
    },
    AccessoryRule {
        role: AccessoryRole::Worktop,
        applicable: base_or_appliance,
        relevant: worktop_relevant,
        compute: compute_worktop,
    },
    AccessoryRule {
        role: AccessoryRole::UnderPanel,
        applicable: overhead,
        relevant: span_relevant,
        compute: compute_under_panel,
    },
    AccessoryRule {
        role: AccessoryRole::Soffit,
        applicable: overhead_or_tall,
        relevant: soffit_relevant,
        compute: compute_soffit,
    },
    AccessoryRule {
        role: AccessoryRole::SoffitReturnLeft,
        applicable: overhead_or_tall,
        relevant: soffit_relevant,
        compute: compute_soffit_return_left,
    },
    AccessoryRule {
        role: AccessoryRole::SoffitReturnRight,
        applicable: overhead_or_tall,
        relevant: soffit_relevant,
        compute: compute_soffit_return_right,
    },
];

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > 1e-9
}

/// Write the target geometry, returning whether anything actually changed
fn write_geometry(unit: &mut Unit, target: &AccessoryGeometry) -> bool {
    let mut changed = false;
    if differs(unit.width, target.width) {
        unit.width = target.width;
        changed = true;
    }
    if differs(unit.height, target.height) {
        unit.height = target.height;
        changed = true;
    }
    if differs(unit.depth, target.depth) {
        unit.depth = target.depth;
        changed = true;
    }
    if differs(unit.position.x, target.position.x)
        || differs(unit.position.y, target.position.y)
        || differs(unit.position.z, target.position.z)
    {
        unit.position = target.position;
        changed = true;
    }
    changed
}

/// Recompute attached filler/closure-panel geometry from the owner
///
/// The child's width stays user-set; its x follows the owner's side, and its
/// vertical extent mirrors the owner, with the door-overhang extension for
/// closure panels of overhead units. Disabling the overhang reverses both
/// because the target is recomputed from owner state, never merged.
fn sync_attached_children(scene: &mut Scene, owner: &Unit, config: &EngineConfig) {
    let child_ids: Vec<UnitId> = scene
        .attached_children(&owner.id)
        .iter()
        .map(|c| c.id.clone())
        .collect();

    for child_id in child_ids {
        let Some(child) = scene.get_mut(&child_id) else {
            continue;
        };
        let side = match child.attachment.as_ref().map(|a| a.side) {
            Some(side) => side,
            None => continue,
        };

        let x = match side {
            Side::Left => owner.left_edge() - child.width,
            Side::Right => owner.right_edge(),
        };
        let overhang = owner.kind == UnitKind::Overhead
            && child.kind == UnitKind::ClosurePanel
            && owner.door_overhang;
        let extension = if overhang {
            config.door_overhang_extension
        } else {
            0.0
        };
        let height = owner.height + extension;
        let y = owner.position.y - extension;

        let mut changed = false;
        if differs(child.position.x, x) || differs(child.position.y, y) {
            child.position.x = x;
            child.position.y = y;
            child.position.z = owner.position.z;
            changed = true;
        }
        if differs(child.height, height) {
            child.height = height;
            changed = true;
        }
        if changed {
            debug!(child = %child_id, owner = %owner.id, "attached child realigned");
        }
    }
}

/// Recompute accessory geometry for `unit_id` after the flagged changes
///
/// Missing units, missing accessories, and missing parents are silent no-ops:
/// accessories are created and destroyed outside this engine.
pub fn propagate(scene: &mut Scene, unit_id: &UnitId, flags: ChangeFlags, config: &EngineConfig) {
    propagate_inner(scene, unit_id, flags, config, true);
}

fn propagate_inner(
    scene: &mut Scene,
    unit_id: &UnitId,
    flags: ChangeFlags,
    config: &EngineConfig,
    allow_upward: bool,
) {
    if !flags.any() {
        return;
    }
    let Some(owner) = scene.get(unit_id).cloned() else {
        return;
    };

    if flags.width || flags.height || flags.position || flags.overhang {
        sync_attached_children(scene, &owner, config);
    }

    let eff = scene
        .effective_extent(unit_id)
        .unwrap_or_else(|| Extent::new(owner.left_edge(), owner.right_edge()));

    for rule in RULES {
        if !(rule.applicable)(owner.kind) || !(rule.relevant)(&flags) {
            continue;
        }
        let Some(idx) = scene.accessory_index(unit_id, rule.role) else {
            continue;
        };
        let target = (rule.compute)(&owner, &eff, config);
        if write_geometry(&mut scene.units[idx], &target) {
            debug!(
                owner = %unit_id,
                role = rule.role.as_str(),
                "accessory geometry recomputed"
            );
        }
    }

    // One-hop upward edge: a changed child refreshes its owner's accessories,
    // whose effective width depends on attached children. Children cannot own
    // children, so the hop never recurses further.
    if allow_upward && (flags.width || flags.position || flags.child) {
        if let Some(parent) = owner.attachment.as_ref().map(|a| a.parent.clone()) {
            propagate_inner(scene, &parent, ChangeFlags::child(), config, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessoryLink, Attachment, UnitKind};

    fn scene_with_kicker() -> Scene {
        let mut scene = Scene::new();
        scene.add(Unit::new("b1", UnitKind::Base, 600.0, 720.0, 560.0).at(100.0, 150.0));
        let mut kicker = Unit::new("k1", UnitKind::Kicker, 1.0, 1.0, 1.0);
        kicker.accessory = Some(AccessoryLink {
            owner: UnitId::new("b1"),
            role: AccessoryRole::Kicker,
        });
        scene.add(kicker);
        scene
    }

    #[test]
    fn test_kicker_follows_owner() {
        let mut scene = scene_with_kicker();
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("b1"), ChangeFlags::all(), &config);

        let kicker = scene.get(&UnitId::new("k1")).unwrap();
        assert_eq!(kicker.width, 600.0);
        assert_eq!(kicker.height, 150.0);
        assert_eq!(kicker.position.x, 100.0);
        assert_eq!(kicker.position.y, 0.0);
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let mut scene = scene_with_kicker();
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("b1"), ChangeFlags::width().with_position(), &config);
        let after_first = scene.clone();
        propagate(&mut scene, &UnitId::new("b1"), ChangeFlags::width().with_position(), &config);

        assert_eq!(scene, after_first);
    }

    #[test]
    fn test_missing_accessory_is_noop() {
        let mut scene = Scene::new();
        scene.add(Unit::new("b1", UnitKind::Base, 600.0, 720.0, 560.0));
        let before = scene.clone();
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("b1"), ChangeFlags::all(), &config);
        propagate(&mut scene, &UnitId::new("ghost"), ChangeFlags::all(), &config);

        assert_eq!(scene, before);
    }

    #[test]
    fn test_child_widens_owner_accessories() {
        let mut scene = scene_with_kicker();
        let mut filler = Unit::new("f1", UnitKind::Filler, 50.0, 720.0, 560.0).at(50.0, 150.0);
        filler.attachment = Some(Attachment {
            parent: UnitId::new("b1"),
            side: Side::Left,
            extends_footprint: true,
        });
        scene.add(filler);
        let config = EngineConfig::default();

        // propagating the child walks the one-hop upward edge to the owner
        propagate(&mut scene, &UnitId::new("f1"), ChangeFlags::width(), &config);

        let kicker = scene.get(&UnitId::new("k1")).unwrap();
        assert_eq!(kicker.width, 650.0);
        assert_eq!(kicker.position.x, 50.0);
    }

    #[test]
    fn test_soffit_fills_to_ceiling() {
        let mut scene = Scene::new();
        scene.add(Unit::new("o1", UnitKind::Overhead, 600.0, 720.0, 320.0).at(0.0, 1400.0));
        let mut soffit = Unit::new("s1", UnitKind::Soffit, 1.0, 1.0, 1.0);
        soffit.accessory = Some(AccessoryLink {
            owner: UnitId::new("o1"),
            role: AccessoryRole::Soffit,
        });
        scene.add(soffit);
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("o1"), ChangeFlags::all(), &config);

        let soffit = scene.get(&UnitId::new("s1")).unwrap();
        // ceiling 2400, owner top 2120
        assert_eq!(soffit.height, 280.0);
        assert_eq!(soffit.position.y, 2120.0);
        assert_eq!(soffit.width, 600.0);
    }

    #[test]
    fn test_door_overhang_toggle_reverses() {
        let mut scene = Scene::new();
        let mut overhead = Unit::new("o1", UnitKind::Overhead, 600.0, 720.0, 320.0).at(0.0, 1400.0);
        overhead.door_overhang = true;
        scene.add(overhead);
        let mut panel = Unit::new("p1", UnitKind::ClosurePanel, 18.0, 720.0, 320.0).at(600.0, 1400.0);
        panel.attachment = Some(Attachment {
            parent: UnitId::new("o1"),
            side: Side::Right,
            extends_footprint: false,
        });
        scene.add(panel);
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("o1"), ChangeFlags::overhang(), &config);
        let panel = scene.get(&UnitId::new("p1")).unwrap();
        assert_eq!(panel.height, 740.0);
        assert_eq!(panel.position.y, 1380.0);

        scene.get_mut(&UnitId::new("o1")).unwrap().door_overhang = false;
        propagate(&mut scene, &UnitId::new("o1"), ChangeFlags::overhang(), &config);
        let panel = scene.get(&UnitId::new("p1")).unwrap();
        assert_eq!(panel.height, 720.0);
        assert_eq!(panel.position.y, 1400.0);
    }

    #[test]
    fn test_irrelevant_flags_do_not_touch_accessories() {
        let mut scene = scene_with_kicker();
        // make the stored kicker wrong on purpose; depth changes are not
        // relevant to kickers, so it must stay wrong
        scene.get_mut(&UnitId::new("k1")).unwrap().width = 42.0;
        let config = EngineConfig::default();

        propagate(&mut scene, &UnitId::new("b1"), ChangeFlags::depth(), &config);

        assert_eq!(scene.get(&UnitId::new("k1")).unwrap().width, 42.0);
    }
}
