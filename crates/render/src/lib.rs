//! Per-eye draw commands for the gaze-hunt scene: static cube and floor meshes,
//! the uniform block each draw uploads, and the backends that consume them.
//!
//! # Invariants
//! - Renderers consume draw commands; they never see or mutate scene state.
//! - Mesh data is built once and never changes.
//! - Every renderer error is fatal to the frame loop.
//!
//! Shader compilation, buffer upload and the platform surface belong to the
//! host. The trait is the seam: a GPU backend implements [`Renderer`] without
//! changing the scene.

mod command;
mod mesh;
mod renderer;

pub use command::{DrawCommand, Program, Uniforms};
pub use mesh::{
    COLOR_OFFSET, CUBE_FOUND_COLOR, CUBE_GENERAL_COLORS, FLOOR_COLOR, Mesh, MeshId, NORMAL_OFFSET,
    POSITION_OFFSET, SceneMeshes, VERTEX_STRIDE, Vertex,
};
pub use renderer::{DebugTextRenderer, RecordingRenderer, RenderError, Renderer};

pub fn crate_info() -> &'static str {
    "gazehunt-render v0.1.0"
}
