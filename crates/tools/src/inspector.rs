use gazehunt_common::Eye;
use gazehunt_scene::{FrameState, GazeRay, Scene, SceneEvent};
use glam::{Mat3, Mat4, Quat};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries against scene state for debugging and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let cube = scene.cube_model();
        SceneSummary {
            frame: scene.frame(),
            looking_at_cube: scene.is_looking_at_cube(),
            cube_position: cube.w_axis.truncate().to_array(),
            cube_rotation_degrees: rotation_degrees(cube),
            pending_events: scene.events().len(),
            last_fps: scene.last_fps(),
        }
    }

    /// Gaze angles and per-eye view data for one frame.
    pub fn inspect_frame(scene: &Scene, frame: &FrameState) -> FrameInspection {
        let eyes = Eye::ALL.map(|eye| {
            let eye_frame = scene.draw_eye(frame, eye);
            let cube_clip = eye_frame.cube.mvp().w_axis;
            EyeInfo {
                eye,
                light_in_eye_space: eye_frame.light_in_eye_space.truncate().to_array(),
                cube_clip: cube_clip.to_array(),
                cube_mesh: eye_frame.cube_mesh.name(),
            }
        });
        FrameInspection {
            frame: frame.frame,
            pitch_degrees: frame.gaze.pitch.to_degrees(),
            yaw_degrees: frame.gaze.yaw.to_degrees(),
            looking_at_cube: frame.looking_at_cube,
            gaze_ray: frame.gaze_ray,
            gaze_point: frame.gaze_point.map(|p| p.to_array()),
            ipd: frame.ipd,
            eyes,
        }
    }

    /// Gaze and reset events still in the log.
    pub fn list_events(scene: &Scene) -> Vec<SceneEvent> {
        scene.events().to_vec()
    }
}

/// Angle of the rotation part of `model`, in degrees within [0, 180].
fn rotation_degrees(model: Mat4) -> f32 {
    let q = Quat::from_mat3(&Mat3::from_mat4(model)).normalize();
    let (_, angle) = q.to_axis_angle();
    let degrees = angle.to_degrees();
    if degrees > 180.0 { 360.0 - degrees } else { degrees }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub frame: u64,
    pub looking_at_cube: bool,
    pub cube_position: [f32; 3],
    pub cube_rotation_degrees: f32,
    pub pending_events: usize,
    pub last_fps: Option<u32>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} looking={} cube=({:.2}, {:.2}, {:.2}) rotation={:.1}deg pending_events={}",
            self.frame,
            self.looking_at_cube,
            self.cube_position[0],
            self.cube_position[1],
            self.cube_position[2],
            self.cube_rotation_degrees,
            self.pending_events,
        )?;
        if let Some(fps) = self.last_fps {
            write!(f, " fps={fps}")?;
        }
        Ok(())
    }
}

/// What one eye saw.
#[derive(Debug, Clone, Serialize)]
pub struct EyeInfo {
    pub eye: Eye,
    pub light_in_eye_space: [f32; 3],
    /// Cube origin in clip space.
    pub cube_clip: [f32; 4],
    pub cube_mesh: &'static str,
}

/// Detailed view of a single frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameInspection {
    pub frame: u64,
    pub pitch_degrees: f32,
    pub yaw_degrees: f32,
    pub looking_at_cube: bool,
    pub gaze_ray: GazeRay,
    /// Eye-tracked gaze on the eye image, `[0.5, 0.5]` being the center.
    pub gaze_point: Option<[f32; 2]>,
    pub ipd: f32,
    pub eyes: [EyeInfo; 2],
}

impl std::fmt::Display for FrameInspection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame {}: pitch={:.2}deg yaw={:.2}deg looking={} ray={:?} ipd={:.3}",
            self.frame,
            self.pitch_degrees,
            self.yaw_degrees,
            self.looking_at_cube,
            self.gaze_ray,
            self.ipd
        )?;
        match self.gaze_point {
            Some([x, y]) => writeln!(f, " gaze_point=({x:.2}, {y:.2})")?,
            None => writeln!(f)?,
        }
        for info in &self.eyes {
            let c = info.cube_clip;
            writeln!(
                f,
                "  {:<5} cube={} clip=({:.2}, {:.2}, {:.2}, {:.2})",
                info.eye, info.cube_mesh, c[0], c[1], c[2], c[3]
            )?;
        }
        Ok(())
    }
}
