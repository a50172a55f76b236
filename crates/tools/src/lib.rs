//! Developer tooling: read-only views of a running scene for logs and the CLI.
//!
//! # Invariants
//! - Inspection never mutates the scene.

mod inspector;

pub use inspector::{EyeInfo, FrameInspection, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "gazehunt-tools v0.1.0"
}
