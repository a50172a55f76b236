use std::time::Instant;

use gazehunt_common::Eye;
use gazehunt_pose::GazeAngles;
use gazehunt_render::{RenderError, Renderer, SceneMeshes};
use glam::Vec2;
use serde::Serialize;

use crate::pose_source::{GazeSource, NoEyeTracking, PoseSource};
use crate::scene::{GazeRay, Scene};

/// Lifecycle of the frame loop as driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    Running,
    Paused,
    ShutDown,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("frame loop has been shut down")]
    ShutDown,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub looking_at_cube: bool,
    pub gaze: GazeAngles,
    pub gaze_ray: GazeRay,
    pub gaze_point: Option<Vec2>,
    pub ipd: f32,
    pub draws: usize,
    pub fps: Option<u32>,
}

/// What a call to [`FrameLoop::run_frame`] did.
#[derive(Debug)]
pub enum FrameOutcome<O> {
    /// Both eyes were drawn; one renderer output per eye in [`Eye::ALL`] order.
    Rendered { report: FrameReport, outputs: Vec<O> },
    /// The loop is paused; nothing was drawn.
    Paused,
    /// The pose source has no more poses.
    Exhausted,
}

/// Drives a [`Scene`]: pose (and eye-tracker sample) in, begin frame, draw
/// each eye, end frame.
pub struct FrameLoop<P, R, G = NoEyeTracking> {
    scene: Scene,
    meshes: SceneMeshes,
    poses: P,
    gazes: G,
    renderer: R,
    state: LoopState,
}

impl<P: PoseSource, R: Renderer> FrameLoop<P, R> {
    /// A loop whose gaze test follows the head until an eye tracker is attached.
    pub fn new(scene: Scene, poses: P, renderer: R) -> Self {
        tracing::info!(
            cube = ?scene.config().cube_position,
            "frame loop created; scene meshes built"
        );
        Self {
            scene,
            meshes: SceneMeshes::build(),
            poses,
            gazes: NoEyeTracking,
            renderer,
            state: LoopState::Running,
        }
    }
}

impl<P: PoseSource, R: Renderer, G: GazeSource> FrameLoop<P, R, G> {
    /// Attach an eye tracker. Frames without a sample fall back to head gaze.
    pub fn with_gaze_source<G2: GazeSource>(self, gazes: G2) -> FrameLoop<P, R, G2> {
        tracing::info!(frame = self.scene.frame(), "eye tracker attached");
        FrameLoop {
            scene: self.scene,
            meshes: self.meshes,
            poses: self.poses,
            gazes,
            renderer: self.renderer,
            state: self.state,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn meshes(&self) -> &SceneMeshes {
        &self.meshes
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (Scene, R) {
        (self.scene, self.renderer)
    }

    /// Stop drawing until [`FrameLoop::resume`]. Scene state is kept.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
            tracing::info!(frame = self.scene.frame(), "frame loop paused");
        }
    }

    /// Continue after a pause. Frame-rate measurement restarts at `now`.
    pub fn resume(&mut self, now: Instant) {
        if self.state == LoopState::Paused {
            self.state = LoopState::Running;
            self.scene.restart_fps(now);
            tracing::info!(frame = self.scene.frame(), "frame loop resumed");
        }
    }

    /// Final. Every later frame request fails with [`FrameError::ShutDown`].
    pub fn shutdown(&mut self) {
        if self.state != LoopState::ShutDown {
            self.state = LoopState::ShutDown;
            tracing::info!(frame = self.scene.frame(), "frame loop shut down");
        }
    }

    /// Run one frame. A renderer error shuts the loop down.
    pub fn run_frame(&mut self, now: Instant) -> Result<FrameOutcome<R::Output>, FrameError> {
        match self.state {
            LoopState::ShutDown => return Err(FrameError::ShutDown),
            LoopState::Paused => return Ok(FrameOutcome::Paused),
            LoopState::Running => {}
        }

        let Some(pose) = self.poses.next_pose(self.scene.frame()) else {
            tracing::debug!(frame = self.scene.frame(), "pose source exhausted");
            return Ok(FrameOutcome::Exhausted);
        };

        let eye_gaze = self.gazes.next_gaze(self.scene.frame());
        let frame = self.scene.begin_frame_with_gaze(&pose, eye_gaze.as_ref());
        let mut outputs = Vec::with_capacity(Eye::ALL.len());
        let mut draws = 0;
        for eye in Eye::ALL {
            let commands = self.scene.draw_eye(&frame, eye).draw_commands(&self.meshes);
            draws += commands.len();
            match self.renderer.render(eye, &commands) {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    tracing::error!(frame = frame.frame, %eye, "render failed: {e}");
                    self.shutdown();
                    return Err(e.into());
                }
            }
        }
        let fps = self.scene.end_frame(now);

        Ok(FrameOutcome::Rendered {
            report: FrameReport {
                frame: frame.frame,
                looking_at_cube: frame.looking_at_cube,
                gaze: frame.gaze,
                gaze_ray: frame.gaze_ray,
                gaze_point: frame.gaze_point,
                ipd: frame.ipd,
                draws,
                fps,
            },
            outputs,
        })
    }

    /// Run up to `max_frames` frames against the wall clock. Stops early when
    /// the pose source runs out or the loop is paused.
    pub fn run(&mut self, max_frames: u64) -> Result<Vec<FrameReport>, FrameError> {
        let _span = tracing::info_span!("run", max_frames).entered();
        let mut reports = Vec::new();
        for _ in 0..max_frames {
            match self.run_frame(Instant::now())? {
                FrameOutcome::Rendered { report, .. } => reports.push(report),
                FrameOutcome::Paused | FrameOutcome::Exhausted => break,
            }
        }
        tracing::info!(frames = reports.len(), "run finished");
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedGaze, FixedPose, SceneConfig, SceneEvent, ScriptedGaze, ScriptedPoses};
    use gazehunt_common::{EyeGaze, Pose};
    use gazehunt_render::{DrawCommand, MeshId, Program, RecordingRenderer};
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn new_loop<P: PoseSource>(poses: P) -> FrameLoop<P, RecordingRenderer> {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        FrameLoop::new(scene, poses, RecordingRenderer::new())
    }

    /// Fails on the n-th render call.
    struct FailingRenderer {
        calls: usize,
        fail_at: usize,
    }

    impl Renderer for FailingRenderer {
        type Output = ();

        fn render(&mut self, _eye: Eye, _commands: &[DrawCommand]) -> Result<(), RenderError> {
            self.calls += 1;
            if self.calls == self.fail_at {
                return Err(RenderError::ShaderLink("missing attribute a_Normal".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn frame_draws_both_eyes_in_order() {
        let mut fl = new_loop(FixedPose::default());
        let outcome = fl.run_frame(Instant::now()).unwrap();
        let FrameOutcome::Rendered { report, outputs } = outcome else {
            panic!("expected a rendered frame");
        };
        assert_eq!(report.frame, 0);
        assert!(report.looking_at_cube);
        assert_eq!(report.draws, 4);
        assert_eq!(outputs, vec![2, 2]);

        let subs = fl.renderer().submissions();
        assert_eq!(subs[0].0, Eye::Left);
        assert_eq!(subs[1].0, Eye::Right);
        for (_, cmds) in subs {
            assert_eq!(cmds[0].program, Program::Floor);
            assert_eq!(cmds[1].mesh, MeshId::CubeFound);
        }
    }

    #[test]
    fn run_stops_when_poses_run_out() {
        let mut fl = new_loop(ScriptedPoses::new([Pose::default(); 3]));
        let reports = fl.run(10).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(fl.scene().frame(), 3);
        assert!(matches!(
            fl.run_frame(Instant::now()).unwrap(),
            FrameOutcome::Exhausted
        ));
    }

    #[test]
    fn run_honours_frame_limit() {
        let mut fl = new_loop(FixedPose::default());
        let reports = fl.run(5).unwrap();
        assert_eq!(reports.iter().map(|r| r.frame).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(fl.renderer().draw_count(), 20);
    }

    #[test]
    fn cube_mesh_follows_gaze() {
        let away = Pose::new(Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO);
        let mut fl = new_loop(ScriptedPoses::new([Pose::default(), away, Pose::default()]));
        let reports = fl.run(3).unwrap();
        assert_eq!(
            reports.iter().map(|r| r.looking_at_cube).collect::<Vec<_>>(),
            vec![true, false, true]
        );

        let cube_meshes: Vec<MeshId> = fl
            .renderer()
            .submissions()
            .iter()
            .map(|(_, cmds)| cmds[1].mesh)
            .collect();
        assert_eq!(
            cube_meshes,
            vec![
                MeshId::CubeFound,
                MeshId::CubeFound,
                MeshId::CubeGeneral,
                MeshId::CubeGeneral,
                MeshId::CubeFound,
                MeshId::CubeFound,
            ]
        );
        assert_eq!(fl.scene().events().len(), 3);
    }

    #[test]
    fn paused_loop_draws_nothing() {
        let mut fl = new_loop(FixedPose::default());
        fl.run(2).unwrap();
        let cube = fl.scene().cube_model();

        fl.pause();
        assert_eq!(fl.state(), LoopState::Paused);
        assert!(matches!(fl.run_frame(Instant::now()).unwrap(), FrameOutcome::Paused));
        assert!(fl.run(5).unwrap().is_empty());
        assert_eq!(fl.scene().cube_model(), cube);
        assert_eq!(fl.renderer().submissions().len(), 4);

        fl.resume(Instant::now());
        assert_eq!(fl.state(), LoopState::Running);
        let reports = fl.run(1).unwrap();
        assert_eq!(reports[0].frame, 2);
    }

    #[test]
    fn shutdown_is_final() {
        let mut fl = new_loop(FixedPose::default());
        fl.shutdown();
        fl.resume(Instant::now());
        assert_eq!(fl.state(), LoopState::ShutDown);
        assert!(matches!(
            fl.run_frame(Instant::now()),
            Err(FrameError::ShutDown)
        ));
    }

    #[test]
    fn render_failure_shuts_loop_down() {
        let scene = Scene::new(SceneConfig::default()).unwrap();
        let renderer = FailingRenderer { calls: 0, fail_at: 2 };
        let mut fl = FrameLoop::new(scene, FixedPose::default(), renderer);

        let err = fl.run(3).unwrap_err();
        assert!(matches!(err, FrameError::Render(RenderError::ShaderLink(_))));
        assert_eq!(fl.state(), LoopState::ShutDown);
        assert_eq!(fl.renderer().calls, 2);
    }

    #[test]
    fn scene_can_be_reset_between_frames() {
        let mut fl = new_loop(FixedPose::default());
        fl.run(10).unwrap();
        fl.scene_mut().reset_cube();
        assert!(matches!(
            fl.scene().events().last(),
            Some(SceneEvent::CubeReset { frame: 10 })
        ));
        let (scene, renderer) = fl.into_parts();
        assert_eq!(scene.frame(), 10);
        assert_eq!(renderer.draw_count(), 40);
    }

    #[test]
    fn eye_tracker_drives_gaze_and_ipd() {
        let cube = Vec3::new(5.0, 0.0, -8.5);
        let scene = Scene::new(SceneConfig {
            cube_position: cube,
            ..SceneConfig::default()
        })
        .unwrap();
        let toward_cube = Pose::new(Quat::from_rotation_y(-cube.x.atan2(-cube.z)), Vec3::ZERO);
        let mut fl = FrameLoop::new(scene, FixedPose::default(), RecordingRenderer::new())
            .with_gaze_source(FixedGaze(EyeGaze::new(toward_cube, 0.064)));

        let reports = fl.run(2).unwrap();
        assert!(reports.iter().all(|r| r.looking_at_cube));
        assert!(reports.iter().all(|r| r.gaze_ray == GazeRay::EyeTracker));
        assert_eq!(reports[0].ipd, 0.064);
        assert!(reports[0].gaze_point.is_some_and(|p| p.x > 0.5));

        let (left, right) = (&fl.renderer().submissions()[0], &fl.renderer().submissions()[1]);
        assert_eq!(left.1[1].mesh, MeshId::CubeFound);
        assert_ne!(left.1[1].uniforms, right.1[1].uniforms);
    }

    #[test]
    fn lost_tracking_falls_back_to_head() {
        let away = Pose::new(Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO);
        let mut fl = new_loop(FixedPose::default())
            .with_gaze_source(ScriptedGaze::new([Some(EyeGaze::new(away, 0.063)), None]));

        let reports = fl.run(2).unwrap();
        assert!(!reports[0].looking_at_cube);
        assert_eq!(reports[0].gaze_ray, GazeRay::EyeTracker);
        assert!(reports[1].looking_at_cube);
        assert_eq!(reports[1].gaze_ray, GazeRay::Head);
        assert_eq!(reports[1].ipd, 0.0);
    }
}
