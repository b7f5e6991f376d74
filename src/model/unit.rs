//! Unit records: the placed furniture and accessory items

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a placed unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Closed set of unit types
///
/// `Kicker`, `Soffit`, and `UnderPanel` are accessory-only: they never exist
/// without an owning furniture unit and are never placed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    Base,
    Tall,
    Overhead,
    Appliance,
    Worktop,
    Filler,
    ClosurePanel,
    Kicker,
    Soffit,
    UnderPanel,
}

impl UnitKind {
    /// Kinds that only exist as derived accessories of a furniture unit
    pub fn is_accessory_only(&self) -> bool {
        matches!(self, Self::Kicker | Self::Soffit | Self::UnderPanel)
    }

    /// Kinds that can be attached to the side of a furniture unit
    pub fn is_attachable(&self) -> bool {
        matches!(self, Self::Filler | Self::ClosurePanel)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Tall => "tall",
            Self::Overhead => "overhead",
            Self::Appliance => "appliance",
            Self::Worktop => "worktop",
            Self::Filler => "filler",
            Self::ClosurePanel => "closure-panel",
            Self::Kicker => "kicker",
            Self::Soffit => "soffit",
            Self::UnderPanel => "under-panel",
        }
    }
}

/// Which side of the parent a filler/closure-panel is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Left,
    Right,
}

/// Attachment of a filler/closure-panel child to a furniture unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub parent: UnitId,
    pub side: Side,
    /// Whether the child widens the parent's effective span
    #[serde(default = "default_true")]
    pub extends_footprint: bool,
}

fn default_true() -> bool {
    true
}

/// Role an accessory plays for its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessoryRole {
    Kicker,
    Worktop,
    UnderPanel,
    Soffit,
    SoffitReturnLeft,
    SoffitReturnRight,
}

impl AccessoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kicker => "kicker",
            Self::Worktop => "worktop",
            Self::UnderPanel => "under-panel",
            Self::Soffit => "soffit",
            Self::SoffitReturnLeft => "soffit-return-left",
            Self::SoffitReturnRight => "soffit-return-right",
        }
    }
}

/// Link from an accessory unit back to the furniture unit that owns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryLink {
    pub owner: UnitId,
    pub role: AccessoryRole,
}

/// Pair-group membership with a percentage weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMembership {
    pub group: String,
    /// Share of a width delta this member absorbs, in percent
    pub weight: f64,
}

/// World position: x along the wall axis, y vertical, z depth offset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A placed furniture or accessory item
///
/// Scalar fields come first so the TOML serializer emits them before the
/// structured sub-tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(default)]
    pub left_lock: bool,
    #[serde(default)]
    pub right_lock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_group: Option<String>,
    /// Named subset used to scope same-row repositioning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Catalog product this unit was placed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Door overhang toggle for overhead units
    #[serde(default)]
    pub door_overhang: bool,
    /// Stamp of the last recalculation that applied an update to this unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated: Option<u64>,
    #[serde(default)]
    pub position: Position,
    /// Set when this unit is a filler/closure-panel child of a furniture unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Set when this unit is a derived accessory of a furniture unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<AccessoryLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairMembership>,
    /// Dimension id -> formula expression
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formulas: BTreeMap<String, String>,
}

impl Unit {
    pub fn new(id: impl Into<UnitId>, kind: UnitKind, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            width,
            height,
            depth,
            position: Position::default(),
            left_lock: false,
            right_lock: false,
            attachment: None,
            accessory: None,
            pair: None,
            sync_group: None,
            view: None,
            product_id: None,
            door_overhang: false,
            formulas: BTreeMap::new(),
            last_evaluated: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position.x = x;
        self.position.y = y;
        self
    }

    /// Left edge along the wall axis
    pub fn left_edge(&self) -> f64 {
        self.position.x
    }

    /// Right edge along the wall axis
    pub fn right_edge(&self) -> f64 {
        self.position.x + self.width
    }

    /// Top of the unit (y plus height)
    pub fn top(&self) -> f64 {
        self.position.y + self.height
    }

    /// Bottom of the unit
    pub fn bottom(&self) -> f64 {
        self.position.y
    }

    /// Whether another unit may snap against this one during a drag
    ///
    /// Accessory-only kinds and attached children follow their owners; they
    /// are never snap or overlap targets in their own right.
    pub fn is_snap_target(&self) -> bool {
        !self.kind.is_accessory_only() && self.accessory.is_none() && self.attachment.is_none()
    }
}

impl From<UnitId> for String {
    fn from(id: UnitId) -> Self {
        id.0
    }
}
