use std::collections::VecDeque;
use std::f32::consts::TAU;

use gazehunt_common::{EyeGaze, Pose};
use glam::{Quat, Vec3};

/// Supplies the head pose for each frame. `None` ends the run.
pub trait PoseSource {
    fn next_pose(&mut self, frame: u64) -> Option<Pose>;
}

impl<F> PoseSource for F
where
    F: FnMut(u64) -> Option<Pose>,
{
    fn next_pose(&mut self, frame: u64) -> Option<Pose> {
        self(frame)
    }
}

/// The same pose every frame, forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPose(pub Pose);

impl PoseSource for FixedPose {
    fn next_pose(&mut self, _frame: u64) -> Option<Pose> {
        Some(self.0)
    }
}

/// A recorded list of poses, played once in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPoses {
    poses: VecDeque<Pose>,
}

impl ScriptedPoses {
    pub fn new(poses: impl IntoIterator<Item = Pose>) -> Self {
        Self {
            poses: poses.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.poses.len()
    }
}

impl PoseSource for ScriptedPoses {
    fn next_pose(&mut self, _frame: u64) -> Option<Pose> {
        self.poses.pop_front()
    }
}

/// Head swinging left and right about +Y on a sine wave.
#[derive(Debug, Clone, Copy)]
pub struct YawSweep {
    /// Peak yaw in radians.
    pub amplitude: f32,
    /// Frames per full left-right-left cycle.
    pub period_frames: u64,
    pub position: Vec3,
}

impl YawSweep {
    pub fn new(amplitude: f32, period_frames: u64) -> Self {
        Self {
            amplitude,
            period_frames: period_frames.max(1),
            position: Vec3::ZERO,
        }
    }

    pub fn yaw_at(&self, frame: u64) -> f32 {
        let period = self.period_frames.max(1);
        let phase = (frame % period) as f32 / period as f32;
        self.amplitude * (phase * TAU).sin()
    }
}

impl PoseSource for YawSweep {
    fn next_pose(&mut self, frame: u64) -> Option<Pose> {
        Some(Pose::new(Quat::from_rotation_y(self.yaw_at(frame)), self.position))
    }
}

/// Supplies eye-tracker samples. `None` means no sample this frame, and the
/// gaze test falls back to the head's forward axis.
pub trait GazeSource {
    fn next_gaze(&mut self, frame: u64) -> Option<EyeGaze>;
}

impl<F> GazeSource for F
where
    F: FnMut(u64) -> Option<EyeGaze>,
{
    fn next_gaze(&mut self, frame: u64) -> Option<EyeGaze> {
        self(frame)
    }
}

/// Host without eye tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEyeTracking;

impl GazeSource for NoEyeTracking {
    fn next_gaze(&mut self, _frame: u64) -> Option<EyeGaze> {
        None
    }
}

/// The same eye-tracker sample every frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedGaze(pub EyeGaze);

impl GazeSource for FixedGaze {
    fn next_gaze(&mut self, _frame: u64) -> Option<EyeGaze> {
        Some(self.0)
    }
}

/// Recorded eye-tracker samples, one slot per frame. `None` slots are frames
/// where tracking was lost; after the last slot there are no samples.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGaze {
    samples: VecDeque<Option<EyeGaze>>,
}

impl ScriptedGaze {
    pub fn new(samples: impl IntoIterator<Item = Option<EyeGaze>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl GazeSource for ScriptedGaze {
    fn next_gaze(&mut self, _frame: u64) -> Option<EyeGaze> {
        self.samples.pop_front().flatten()
    }
}
