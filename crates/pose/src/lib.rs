//! Pose pipeline: the fixed-function math that turns a head pose into matrices
//! and decides whether the user is looking at an object.
//!
//! All matrices are column-major `glam::Mat4` in the OpenGL clip convention.
//!
//! # Invariants
//! - Functions here are pure; no state survives a call.
//! - `quat_to_matrix` does not normalize. A unit quaternion in gives an
//!   orthonormal rotation out; anything else gives a skewed matrix.

mod gaze;
mod matrix;

pub use gaze::{
    GazeAngles, GazeCone, angle_to_plane, gaze_angles, is_looking_at, ray_angles, screen_point,
};
pub use matrix::{
    ProjectionError, frustum, head_view, look_at, perspective, quat_to_matrix, rotate, translate,
};

pub fn crate_info() -> &'static str {
    "gazehunt-pose v0.1.0"
}
