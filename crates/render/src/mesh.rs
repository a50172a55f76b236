use bytemuck::{Pod, Zeroable};

/// Interleaved vertex: position, RGBA color, normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
}

/// Byte layout the host binds vertex attributes with.
pub const VERTEX_STRIDE: usize = std::mem::size_of::<Vertex>();
pub const POSITION_OFFSET: usize = 0;
pub const COLOR_OFFSET: usize = 3 * 4;
pub const NORMAL_OFFSET: usize = (3 + 4) * 4;

/// Per-face colors of the cube while nobody is looking at it (+Z, -Z, +X, -X, +Y, -Y).
pub const CUBE_GENERAL_COLORS: [[f32; 4]; 6] = [
    [0.0, 0.5273, 0.2656, 1.0],
    [0.8359, 0.1758, 0.1250, 1.0],
    [0.0, 0.3398, 0.9023, 1.0],
    [0.8984, 0.8984, 0.2656, 1.0],
    [0.5586, 0.2656, 0.8984, 1.0],
    [0.2656, 0.8984, 0.8359, 1.0],
];

/// Uniform color of the cube while it is being looked at.
pub const CUBE_FOUND_COLOR: [f32; 4] = [1.0, 0.6523, 0.0, 1.0];

pub const FLOOR_COLOR: [f32; 4] = [0.0, 0.3398, 0.9023, 1.0];

const CUBE_HALF_EXTENT: f32 = 1.0;
const FLOOR_HALF_EXTENT: f32 = 200.0;

/// Identifies one of the static meshes the scene draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshId {
    Floor,
    CubeGeneral,
    CubeFound,
}

impl MeshId {
    pub fn name(self) -> &'static str {
        match self {
            MeshId::Floor => "floor",
            MeshId::CubeGeneral => "cube-general",
            MeshId::CubeFound => "cube-found",
        }
    }

    /// Cube variant for a gaze-test result.
    pub fn cube(found: bool) -> Self {
        if found {
            MeshId::CubeFound
        } else {
            MeshId::CubeGeneral
        }
    }
}

/// Vertex and index data for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// All meshes the scene uses. Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct SceneMeshes {
    floor: Mesh,
    cube_general: Mesh,
    cube_found: Mesh,
}

impl SceneMeshes {
    pub fn build() -> Self {
        Self {
            floor: floor_mesh(),
            cube_general: cube_mesh(CUBE_GENERAL_COLORS),
            cube_found: cube_mesh([CUBE_FOUND_COLOR; 6]),
        }
    }

    pub fn get(&self, id: MeshId) -> &Mesh {
        match id {
            MeshId::Floor => &self.floor,
            MeshId::CubeGeneral => &self.cube_general,
            MeshId::CubeFound => &self.cube_found,
        }
    }
}

impl Default for SceneMeshes {
    fn default() -> Self {
        Self::build()
    }
}

/// Cube of half-extent 1 centered on the origin, one color per face.
fn cube_mesh(face_colors: [[f32; 4]; 6]) -> Mesh {
    let p = CUBE_HALF_EXTENT;
    #[rustfmt::skip]
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        // +Z
        ([[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]], [0.0, 0.0, 1.0]),
        // -Z
        ([[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]], [0.0, 0.0, -1.0]),
        // +X
        ([[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]], [1.0, 0.0, 0.0]),
        // -X
        ([[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]], [-1.0, 0.0, 0.0]),
        // +Y
        ([[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]], [0.0, 1.0, 0.0]),
        // -Y
        ([[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]], [0.0, -1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, ((corners, normal), color)) in faces.iter().zip(face_colors).enumerate() {
        let base = (face * 4) as u16;
        for position in corners {
            vertices.push(Vertex {
                position: *position,
                color,
                normal: *normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    Mesh { vertices, indices }
}

/// Flat square floor at y = 0; the grid lines come from the floor shader.
fn floor_mesh() -> Mesh {
    let e = FLOOR_HALF_EXTENT;
    let up = [0.0, 1.0, 0.0];
    let vertices = [[e, 0.0, -e], [-e, 0.0, -e], [-e, 0.0, e], [e, 0.0, e]]
        .into_iter()
        .map(|position| Vertex {
            position,
            color: FLOOR_COLOR,
            normal: up,
        })
        .collect();
    Mesh {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
