//! Scene state and the per-frame update: a spinning cube in front of the user,
//! a floor below, and a gaze test that decides which cube mesh is drawn.
//!
//! A frame is `begin_frame` (once), `draw_eye` (once per eye), `end_frame`.
//! [`FrameLoop`] strings those together for a pose source and a renderer.
//!
//! # Invariants
//! - The cube's translation never changes; each frame post-multiplies one
//!   rotation step onto its model matrix.
//! - Both eyes of a frame see the same cube model and the same gaze result.
//! - A gaze event is logged only when the result differs from the previous frame.
//! - The gaze test follows the eye-tracker ray when the host supplies one for
//!   the frame, and the head's forward axis otherwise.
//! - After shutdown the frame loop draws nothing and cannot be resumed.

mod config;
mod fps;
mod frame_loop;
mod pose_source;
mod scene;

pub use config::{ConfigError, ProjectionConfig, RotationConfig, SceneConfig};
pub use fps::FpsCounter;
pub use frame_loop::{FrameError, FrameLoop, FrameOutcome, FrameReport, LoopState};
pub use pose_source::{
    FixedGaze, FixedPose, GazeSource, NoEyeTracking, PoseSource, ScriptedGaze, ScriptedPoses,
    YawSweep,
};
pub use scene::{EyeFrame, FrameState, GazeRay, Scene, SceneError, SceneEvent};

pub fn crate_info() -> &'static str {
    "gazehunt-scene v0.1.0"
}
