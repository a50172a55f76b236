//! Shared value types passed between the host, the pose pipeline and the scene.
//!
//! # Invariants
//! - A `Pose` is a plain value; nothing here normalizes or mutates it.
//! - Angles in `FieldOfView` are degrees, everything else is radians.

mod types;

pub use types::{Eye, EyeGaze, FieldOfView, Pose, PoseError, UNIT_TOLERANCE};

pub fn crate_info() -> &'static str {
    "gazehunt-common v0.1.0"
}
