use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::mesh::{MeshId, SceneMeshes};

/// Shader program a draw goes through. Both share the lit vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Lit vertex shader + grid fragment shader.
    Floor,
    /// Lit vertex shader + passthrough fragment shader.
    Cube,
}

impl Program {
    pub fn name(self) -> &'static str {
        match self {
            Program::Floor => "floor",
            Program::Cube => "cube",
        }
    }
}

/// Uniform block for one draw, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub model: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
    /// Light position in eye space; `w` is carried but the shaders read `xyz`.
    pub light_pos: [f32; 4],
}

impl Uniforms {
    pub fn new(model: Mat4, model_view: Mat4, model_view_projection: Mat4, light_pos: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            model_view_projection: model_view_projection.to_cols_array_2d(),
            light_pos: light_pos.to_array(),
        }
    }

    pub fn mvp(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_view_projection)
    }

    pub fn light(&self) -> Vec4 {
        Vec4::from_array(self.light_pos)
    }
}

/// One indexed draw the host executes: bind `mesh`, use `program`, upload `uniforms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub program: Program,
    pub mesh: MeshId,
    pub index_count: u32,
    pub uniforms: Uniforms,
}

impl DrawCommand {
    pub fn new(program: Program, mesh: MeshId, meshes: &SceneMeshes, uniforms: Uniforms) -> Self {
        Self {
            program,
            mesh,
            index_count: meshes.get(mesh).index_count(),
            uniforms,
        }
    }
}
