//! Scene container: every placed unit plus selection state

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::unit::{AccessoryRole, Side, Unit, UnitId};

/// A horizontal span along the wall axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub left: f64,
    pub right: f64,
}

impl Extent {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Axis-aligned overlap with a shrink epsilon so touching edges don't count
    pub fn overlaps(&self, other: &Extent, epsilon: f64) -> bool {
        self.left + epsilon < other.right && self.right - epsilon > other.left
    }
}

/// All placed units plus the current selection
///
/// `selection` precedes `units` so the TOML serializer emits the plain array
/// before the array of tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub selection: HashSet<UnitId>,
    pub units: Vec<Unit>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(units: Vec<Unit>) -> Self {
        Self {
            units,
            selection: HashSet::new(),
        }
    }

    pub fn add(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn get(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn get_mut(&mut self, id: &UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| &u.id == id)
    }

    pub fn index_of(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|u| &u.id == id)
    }

    /// Filler/closure-panel children attached to the given unit
    pub fn attached_children(&self, parent: &UnitId) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| {
                u.attachment
                    .as_ref()
                    .is_some_and(|a| &a.parent == parent)
            })
            .collect()
    }

    /// The accessory of `owner` playing `role`, if it exists
    pub fn accessory_of(&self, owner: &UnitId, role: AccessoryRole) -> Option<&Unit> {
        self.units.iter().find(|u| {
            u.accessory
                .as_ref()
                .is_some_and(|l| &l.owner == owner && l.role == role)
        })
    }

    pub fn accessory_index(&self, owner: &UnitId, role: AccessoryRole) -> Option<usize> {
        self.units.iter().position(|u| {
            u.accessory
                .as_ref()
                .is_some_and(|l| &l.owner == owner && l.role == role)
        })
    }

    /// The unit's span widened by footprint-extending attached children
    pub fn effective_extent(&self, id: &UnitId) -> Option<Extent> {
        let unit = self.get(id)?;
        let mut extent = Extent::new(unit.left_edge(), unit.right_edge());
        for child in self.attached_children(id) {
            if !child.attachment.as_ref().is_some_and(|a| a.extends_footprint) {
                continue;
            }
            match child.attachment.as_ref().map(|a| a.side) {
                Some(Side::Left) => extent.left -= child.width,
                Some(Side::Right) => extent.right += child.width,
                None => {}
            }
        }
        Some(extent)
    }

    /// Members of a pair group, in scene order
    pub fn pair_members(&self, group: &str) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| u.pair.as_ref().is_some_and(|p| p.group == group))
            .collect()
    }

    /// Members of a sync group, in scene order
    pub fn sync_members(&self, group: &str) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| u.sync_group.as_deref() == Some(group))
            .collect()
    }

    /// Units assigned to the given view, in scene order
    pub fn units_in_view(&self, view: &str) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| u.view.as_deref() == Some(view))
            .collect()
    }

    pub fn select(&mut self, id: impl Into<UnitId>) {
        self.selection.insert(id.into());
    }

    pub fn deselect(&mut self, id: &UnitId) {
        self.selection.remove(id);
    }

    pub fn is_selected(&self, id: &UnitId) -> bool {
        self.selection.contains(id)
    }

    /// How many members of a sync group are currently selected
    pub fn selected_sync_count(&self, group: &str) -> usize {
        self.sync_members(group)
            .iter()
            .filter(|u| self.selection.contains(&u.id))
            .count()
    }
}
