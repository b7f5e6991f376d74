//! Geometry model shared by every resolver
//!
//! This module holds the passive data describing placed units: their kind,
//! size, position, lock state, group memberships, and accessory links. It has
//! no resolution behavior of its own; the engine modules mutate it in place.

pub mod scene;
pub mod unit;

pub use scene::{Extent, Scene};
pub use unit::{
    AccessoryLink, AccessoryRole, Attachment, PairMembership, Position, Side, Unit, UnitId,
    UnitKind,
};
