use std::time::Instant;

use gazehunt_common::{Eye, EyeGaze, Pose};
use gazehunt_pose::{
    GazeAngles, ProjectionError, gaze_angles, head_view, look_at, perspective, ray_angles,
    rotate, screen_point,
};
use gazehunt_render::{DrawCommand, MeshId, Program, SceneMeshes, Uniforms};
use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SceneConfig};
use crate::fps::FpsCounter;

/// A record of every observable change in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// The cube moved into the gaze cone on this frame.
    GazeEntered { frame: u64, angles: GazeAngles },
    /// The cube left the gaze cone on this frame.
    GazeLeft { frame: u64, angles: GazeAngles },
    /// The cube was put back at its start position with no rotation.
    CubeReset { frame: u64 },
}

/// Errors from building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
}

/// Which ray the gaze test ran along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GazeRay {
    /// The head's forward (-Z) axis.
    Head,
    /// A ray supplied by the host's eye tracker.
    EyeTracker,
}

/// Everything `begin_frame` computed for one frame. Shared by both eyes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame: u64,
    pub pose: Pose,
    pub camera: Mat4,
    pub head_view: Mat4,
    /// Cube model matrix after this frame's rotation step.
    pub cube_model: Mat4,
    pub gaze: GazeAngles,
    pub looking_at_cube: bool,
    pub gaze_ray: GazeRay,
    /// Where the eye-tracked gaze lands on the eye image, `(0.5, 0.5)` being
    /// straight ahead. `None` without an eye-tracker sample.
    pub gaze_point: Option<Vec2>,
    /// Eye separation used for this frame's views.
    pub ipd: f32,
}

/// Everything one eye needs to draw the floor and the cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFrame {
    pub eye: Eye,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_in_eye_space: Vec4,
    pub floor: Uniforms,
    pub cube: Uniforms,
    pub cube_mesh: MeshId,
}

impl EyeFrame {
    /// Draw list for this eye: floor first, then the cube.
    pub fn draw_commands(&self, meshes: &SceneMeshes) -> Vec<DrawCommand> {
        vec![
            DrawCommand::new(Program::Floor, MeshId::Floor, meshes, self.floor),
            DrawCommand::new(Program::Cube, self.cube_mesh, meshes, self.cube),
        ]
    }
}

/// Scene state: the cube's accumulated rotation plus the fixed floor and projection.
///
/// All per-frame matrices are returned by value from [`Scene::begin_frame`] and
/// [`Scene::draw_eye`]; the only state carried between frames is the cube model,
/// the last gaze result and the event log.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    projection: Mat4,
    cube_model: Mat4,
    floor_model: Mat4,
    frame: u64,
    looking_at_cube: bool,
    warned_non_unit: bool,
    fps: FpsCounter,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let projection = perspective(
            config.projection.near,
            config.projection.far,
            &config.projection.fov,
        )?;
        Ok(Self {
            projection,
            cube_model: Mat4::from_translation(config.cube_position),
            floor_model: Mat4::from_translation(Vec3::new(0.0, -config.floor_depth, 0.0)),
            frame: 0,
            looking_at_cube: false,
            warned_non_unit: false,
            fps: FpsCounter::new(),
            event_log: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of frames begun so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn cube_model(&self) -> Mat4 {
        self.cube_model
    }

    pub fn floor_model(&self) -> Mat4 {
        self.floor_model
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Gaze result of the most recent frame.
    pub fn is_looking_at_cube(&self) -> bool {
        self.looking_at_cube
    }

    pub fn last_fps(&self) -> Option<u32> {
        self.fps.last()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Start of a frame: spin the cube, rebuild the camera, turn the head pose
    /// into a head view and run the gaze test along the head's forward axis.
    pub fn begin_frame(&mut self, pose: &Pose) -> FrameState {
        self.begin_frame_with_gaze(pose, None)
    }

    /// Like [`Scene::begin_frame`], but with an optional eye-tracker sample.
    /// With a sample the gaze test runs along the tracked ray and the
    /// tracker's IPD replaces the configured one for this frame.
    pub fn begin_frame_with_gaze(&mut self, pose: &Pose, eye_gaze: Option<&EyeGaze>) -> FrameState {
        let frame = self.frame;
        let _span = tracing::debug_span!("begin_frame", frame).entered();

        if pose.has_unit_orientation() {
            self.warned_non_unit = false;
        } else if !self.warned_non_unit {
            tracing::warn!(
                length = pose.orientation.length(),
                "head orientation is not a unit quaternion; view will be skewed"
            );
            self.warned_non_unit = true;
        }

        let rotation = &self.config.rotation;
        self.cube_model = rotate(self.cube_model, rotation.step_degrees, rotation.axis);

        let camera = look_at(Vec3::new(0.0, 0.0, self.config.camera_z), Vec3::ZERO, Vec3::Y);
        let tracked_view = eye_gaze.map(|sample| head_view(&sample.pose));
        let head_view = head_view(pose);
        let (gaze_view, gaze_ray) = match tracked_view {
            Some(view) => (view, GazeRay::EyeTracker),
            None => (head_view, GazeRay::Head),
        };
        let gaze_point = eye_gaze.map(|sample| {
            let angles = ray_angles(sample.direction(), pose.orientation);
            screen_point(angles, &self.config.projection.fov)
        });
        let ipd = match eye_gaze.map(|sample| (sample.ipd, sample.valid_ipd())) {
            Some((_, Some(ipd))) => ipd,
            Some((raw, None)) => {
                tracing::warn!(ipd = raw, "eye tracker reported an unusable IPD; using config");
                self.config.ipd
            }
            None => self.config.ipd,
        };

        let gaze = gaze_angles(gaze_view, self.cube_model);
        let looking_at_cube = self.config.gaze.contains(gaze);
        if looking_at_cube != self.looking_at_cube {
            let event = if looking_at_cube {
                tracing::info!(frame, ray = ?gaze_ray, pitch = gaze.pitch, yaw = gaze.yaw, "gaze entered cube");
                SceneEvent::GazeEntered { frame, angles: gaze }
            } else {
                tracing::info!(frame, ray = ?gaze_ray, pitch = gaze.pitch, yaw = gaze.yaw, "gaze left cube");
                SceneEvent::GazeLeft { frame, angles: gaze }
            };
            self.event_log.push(event);
        }
        self.looking_at_cube = looking_at_cube;
        self.frame += 1;

        FrameState {
            frame,
            pose: *pose,
            camera,
            head_view,
            cube_model: self.cube_model,
            gaze,
            looking_at_cube,
            gaze_ray,
            gaze_point,
            ipd,
        }
    }

    /// Per-eye pass: view and eye-space light, then model-view and MVP for the
    /// floor and the cube.
    pub fn draw_eye(&self, frame: &FrameState, eye: Eye) -> EyeFrame {
        let eye_offset = Mat4::from_translation(-eye.offset(frame.ipd));
        let view = eye_offset * frame.head_view * frame.camera;
        let light_in_eye_space = view * self.config.light_position.extend(1.0);

        let floor_mv = view * self.floor_model;
        let floor = Uniforms::new(
            self.floor_model,
            floor_mv,
            self.projection * floor_mv,
            light_in_eye_space,
        );

        let cube_mv = view * frame.cube_model;
        let cube = Uniforms::new(
            frame.cube_model,
            cube_mv,
            self.projection * cube_mv,
            light_in_eye_space,
        );

        EyeFrame {
            eye,
            view,
            projection: self.projection,
            light_in_eye_space,
            floor,
            cube,
            cube_mesh: MeshId::cube(frame.looking_at_cube),
        }
    }

    /// End of a frame. Returns the frame rate when a measurement window closes.
    pub fn end_frame(&mut self, now: Instant) -> Option<u32> {
        let fps = self.fps.tick(now);
        if let Some(fps) = fps {
            tracing::debug!(fps, frame = self.frame, "frame rate");
        }
        fps
    }

    /// Restart frame-rate measurement, e.g. after the host resumes rendering.
    pub fn restart_fps(&mut self, now: Instant) {
        self.fps.start(now);
    }

    /// Put the cube back at its configured position, dropping accumulated rotation.
    pub fn reset_cube(&mut self) {
        self.cube_model = Mat4::from_translation(self.config.cube_position);
        self.event_log.push(SceneEvent::CubeReset { frame: self.frame });
        tracing::info!(frame = self.frame, "cube reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat3, Quat};
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    fn scene() -> Scene {
        Scene::new(SceneConfig::default()).unwrap()
    }

    fn scene_with_cube_at(position: Vec3) -> Scene {
        Scene::new(SceneConfig {
            cube_position: position,
            ..SceneConfig::default()
        })
        .unwrap()
    }

    fn turned(yaw: f32) -> Pose {
        Pose::new(Quat::from_rotation_y(yaw), Vec3::ZERO)
    }

    #[test]
    fn new_scene_places_cube_and_floor() {
        let s = scene();
        assert_eq!(s.frame(), 0);
        assert_eq!(s.cube_model(), Mat4::from_translation(Vec3::new(0.0, 0.0, -8.5)));
        assert_eq!(s.floor_model(), Mat4::from_translation(Vec3::new(0.0, -40.0, 0.0)));
        assert!(s.events().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.projection.far = 0.01;
        assert!(matches!(Scene::new(config), Err(SceneError::Config(_))));
    }

    #[test]
    fn identity_pose_finds_cube_ahead() {
        let mut s = scene();
        let frame = s.begin_frame(&Pose::default());
        assert!(frame.looking_at_cube);
        assert!(s.is_looking_at_cube());

        let eye = s.draw_eye(&frame, Eye::Left);
        assert_eq!(eye.cube_mesh, MeshId::CubeFound);
    }

    #[test]
    fn identity_pose_misses_offset_cube() {
        let mut s = scene_with_cube_at(Vec3::new(5.0, 0.0, -8.5));
        let frame = s.begin_frame(&Pose::default());
        assert!(!frame.looking_at_cube);
        assert!(s.events().is_empty());

        let eye = s.draw_eye(&frame, Eye::Left);
        assert_eq!(eye.cube_mesh, MeshId::CubeGeneral);
    }

    #[test]
    fn frames_are_numbered_from_zero() {
        let mut s = scene();
        assert_eq!(s.begin_frame(&Pose::default()).frame, 0);
        assert_eq!(s.begin_frame(&Pose::default()).frame, 1);
        assert_eq!(s.frame(), 2);
    }

    #[test]
    fn rotation_keeps_cube_in_place() {
        let mut s = scene();
        let start = s.cube_model();
        for _ in 0..50 {
            s.begin_frame(&Pose::default());
        }
        assert!(s.cube_model().w_axis.abs_diff_eq(start.w_axis, EPS));
        assert!(!s.cube_model().abs_diff_eq(start, EPS));
    }

    #[test]
    fn full_turn_after_277_frames() {
        // 277 * 1.3 = 360.1 degrees.
        let mut s = scene();
        for _ in 0..277 {
            s.begin_frame(&Pose::default());
        }
        assert!(Mat3::from_mat4(s.cube_model()).abs_diff_eq(Mat3::IDENTITY, 5e-3));

        let mut half = scene();
        for _ in 0..138 {
            half.begin_frame(&Pose::default());
        }
        assert!(!Mat3::from_mat4(half.cube_model()).abs_diff_eq(Mat3::IDENTITY, 0.5));
    }

    #[test]
    fn rotation_rate_ignores_axis_length() {
        let mut a = scene();
        let mut b = Scene::new(SceneConfig {
            rotation: crate::RotationConfig {
                axis: Vec3::new(1.0, 1.0, 2.0),
                ..Default::default()
            },
            ..SceneConfig::default()
        })
        .unwrap();
        for _ in 0..10 {
            a.begin_frame(&Pose::default());
            b.begin_frame(&Pose::default());
        }
        assert!(a.cube_model().abs_diff_eq(b.cube_model(), EPS));
    }

    #[test]
    fn light_is_moved_into_eye_space() {
        let mut s = scene();
        let frame = s.begin_frame(&Pose::default());
        let eye = s.draw_eye(&frame, Eye::Left);
        // Identity head; the camera only pulls the world back by camera_z.
        assert!(eye
            .light_in_eye_space
            .abs_diff_eq(Vec4::new(0.0, 2.0, -0.01, 1.0), EPS));
        assert_eq!(eye.cube.light(), eye.light_in_eye_space);
        assert_eq!(eye.floor.light(), eye.light_in_eye_space);
    }

    #[test]
    fn view_combines_head_and_camera() {
        let mut s = scene();
        let pose = Pose::new(Quat::from_rotation_x(0.3), Vec3::new(0.0, -1.6, 0.0));
        let frame = s.begin_frame(&pose);
        let eye = s.draw_eye(&frame, Eye::Right);
        assert!(eye.view.abs_diff_eq(frame.head_view * frame.camera, EPS));
        assert_eq!(eye.projection, s.projection());
    }

    #[test]
    fn uniforms_carry_model_view_and_mvp() {
        let mut s = scene();
        let frame = s.begin_frame(&Pose::default());
        let eye = s.draw_eye(&frame, Eye::Left);

        let cube_mv = eye.view * frame.cube_model;
        assert_eq!(eye.cube.model, frame.cube_model.to_cols_array_2d());
        assert_eq!(eye.cube.model_view, cube_mv.to_cols_array_2d());
        assert_eq!(eye.cube.mvp(), s.projection() * cube_mv);

        let floor_mv = eye.view * s.floor_model();
        assert_eq!(eye.floor.mvp(), s.projection() * floor_mv);
    }

    #[test]
    fn floor_is_drawn_before_cube() {
        let mut s = scene();
        let meshes = SceneMeshes::build();
        let frame = s.begin_frame(&Pose::default());
        let commands = s.draw_eye(&frame, Eye::Left).draw_commands(&meshes);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].program, Program::Floor);
        assert_eq!(commands[0].mesh, MeshId::Floor);
        assert_eq!(commands[1].program, Program::Cube);
        assert_eq!(commands[1].mesh, MeshId::CubeFound);
        assert_eq!(commands[1].index_count, 36);
    }

    #[test]
    fn eyes_match_without_ipd() {
        let mut s = scene();
        let frame = s.begin_frame(&turned(0.2));
        let left = s.draw_eye(&frame, Eye::Left);
        let right = s.draw_eye(&frame, Eye::Right);
        assert_eq!(left.view, right.view);
        assert_eq!(left.cube, right.cube);
    }

    #[test]
    fn ipd_separates_eyes() {
        let mut s = Scene::new(SceneConfig {
            ipd: 0.064,
            ..SceneConfig::default()
        })
        .unwrap();
        let frame = s.begin_frame(&Pose::default());
        let left = s.draw_eye(&frame, Eye::Left);
        let right = s.draw_eye(&frame, Eye::Right);
        let dx = left.view.w_axis.x - right.view.w_axis.x;
        assert!((dx - 0.064).abs() < EPS);
    }

    #[test]
    fn gaze_transitions_are_logged_once() {
        let mut s = scene();
        s.begin_frame(&Pose::default());
        s.begin_frame(&Pose::default());
        s.begin_frame(&turned(FRAC_PI_2));
        s.begin_frame(&turned(FRAC_PI_2));
        s.begin_frame(&Pose::default());

        let events = s.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SceneEvent::GazeEntered { frame: 0, .. }));
        assert!(matches!(events[1], SceneEvent::GazeLeft { frame: 2, .. }));
        assert!(matches!(events[2], SceneEvent::GazeEntered { frame: 4, .. }));
    }

    #[test]
    fn drain_events_clears_log() {
        let mut s = scene();
        s.begin_frame(&Pose::default());
        assert_eq!(s.drain_events().len(), 1);
        assert!(s.events().is_empty());
    }

    #[test]
    fn reset_cube_drops_rotation() {
        let mut s = scene();
        for _ in 0..20 {
            s.begin_frame(&Pose::default());
        }
        s.reset_cube();
        assert_eq!(s.cube_model(), Mat4::from_translation(s.config().cube_position));
        assert!(matches!(
            s.events().last(),
            Some(SceneEvent::CubeReset { frame: 20 })
        ));
    }

    #[test]
    fn non_unit_orientation_is_used_as_given() {
        let mut s = scene();
        let pose = Pose::from_raw([0.0, 0.0, 0.0, 2.0], [0.0; 3]);
        let frame = s.begin_frame(&pose);
        assert!((frame.head_view.x_axis.truncate().length() - 4.0).abs() < EPS);
        // Uniform scaling keeps the cube on the forward axis.
        assert!(frame.looking_at_cube);
    }

    #[test]
    fn end_frame_reports_fps_after_a_second() {
        let mut s = scene();
        let t0 = Instant::now();
        s.restart_fps(t0);
        for i in 1..=30 {
            s.begin_frame(&Pose::default());
            let now = t0 + std::time::Duration::from_millis(i * 20);
            assert_eq!(s.end_frame(now), None);
        }
        s.begin_frame(&Pose::default());
        let fps = s.end_frame(t0 + std::time::Duration::from_millis(1001));
        assert_eq!(fps, Some(30));
        assert_eq!(s.last_fps(), Some(30));
    }

    #[test]
    fn non_unit_warning_rearms_after_unit_pose() {
        let mut s = scene();
        let skewed = Pose::from_raw([0.0, 0.0, 0.0, 2.0], [0.0; 3]);
        s.begin_frame(&skewed);
        assert!(s.warned_non_unit);
        s.begin_frame(&skewed);
        assert!(s.warned_non_unit);
        s.begin_frame(&Pose::default());
        assert!(!s.warned_non_unit);
        s.begin_frame(&skewed);
        assert!(s.warned_non_unit);
    }

    #[test]
    fn head_gaze_frame_has_no_tracker_data() {
        let mut s = scene();
        let frame = s.begin_frame(&Pose::default());
        assert_eq!(frame.gaze_ray, GazeRay::Head);
        assert_eq!(frame.gaze_point, None);
        assert_eq!(frame.ipd, 0.0);
    }

    #[test]
    fn tracked_gaze_finds_cube_the_head_misses() {
        let cube = Vec3::new(5.0, 0.0, -8.5);
        let mut s = scene_with_cube_at(cube);
        // Eyes turned right toward the cube while the head faces ahead.
        let eyes = EyeGaze::new(turned(-cube.x.atan2(-cube.z)), 0.063);
        let frame = s.begin_frame_with_gaze(&Pose::default(), Some(&eyes));

        assert_eq!(frame.gaze_ray, GazeRay::EyeTracker);
        assert!(frame.looking_at_cube);
        assert_eq!(s.draw_eye(&frame, Eye::Left).cube_mesh, MeshId::CubeFound);

        let mut head_only = scene_with_cube_at(cube);
        assert!(!head_only.begin_frame(&Pose::default()).looking_at_cube);
    }

    #[test]
    fn tracked_gaze_can_look_away_from_cube_ahead() {
        let mut s = scene();
        let eyes = EyeGaze::new(turned(0.3), 0.063);
        let frame = s.begin_frame_with_gaze(&Pose::default(), Some(&eyes));
        assert!(!frame.looking_at_cube);
        assert!(s.events().is_empty());
    }

    #[test]
    fn tracked_gaze_maps_to_screen_point() {
        let mut s = scene();
        let ahead = EyeGaze::new(Pose::default(), 0.063);
        let frame = s.begin_frame_with_gaze(&Pose::default(), Some(&ahead));
        let center = frame.gaze_point.unwrap();
        assert!(center.abs_diff_eq(Vec2::new(0.5, 0.5), 1e-6));

        // Looking right lands right of center; the head's own turn is removed.
        let head = turned(0.4);
        let eyes = EyeGaze::new(turned(0.2), 0.063);
        let frame = s.begin_frame_with_gaze(&head, Some(&eyes));
        let point = frame.gaze_point.unwrap();
        assert!(point.x > 0.5);
        assert!((point.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn tracker_ipd_separates_eyes() {
        let mut s = scene();
        let eyes = EyeGaze::new(Pose::default(), 0.064);
        let frame = s.begin_frame_with_gaze(&Pose::default(), Some(&eyes));
        assert_eq!(frame.ipd, 0.064);

        let left = s.draw_eye(&frame, Eye::Left);
        let right = s.draw_eye(&frame, Eye::Right);
        assert!((left.view.w_axis.x - right.view.w_axis.x - 0.064).abs() < EPS);
    }

    #[test]
    fn unusable_tracker_ipd_falls_back_to_config() {
        let mut s = Scene::new(SceneConfig {
            ipd: 0.06,
            ..SceneConfig::default()
        })
        .unwrap();
        let eyes = EyeGaze::new(Pose::default(), f32::NAN);
        let frame = s.begin_frame_with_gaze(&Pose::default(), Some(&eyes));
        assert_eq!(frame.ipd, 0.06);
    }
}
