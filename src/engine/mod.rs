//! Resolvers that keep the geometry model consistent
//!
//! Three cooperating pieces: the dependent-component propagator keeps
//! accessory geometry derived from owners, the width-change resolver applies
//! committed width edits under lock/pair/sync policy, and the snap resolver
//! corrects live drag positions. The propagator never calls back into the
//! resolvers; control always flows downward.

pub mod config;
pub mod error;
pub mod propagate;
pub mod resize;
pub mod snap;

pub use config::EngineConfig;
pub use error::ResizeRejection;
pub use propagate::{propagate, ChangeFlags};
pub use resize::{resize_width, WidthApplied};
pub use snap::{compute_snap, Point, SnapKind, SnapPoint, SnapResult, WallSegment};
