use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Maximum deviation of a quaternion's length from 1.0 that still counts as unit.
pub const UNIT_TOLERANCE: f32 = 1e-3;

/// Head pose for one frame: orientation plus position, as reported by the host.
///
/// The orientation is expected to be a unit quaternion. Nothing in the pipeline
/// enforces that; a non-unit orientation yields a skewed (non-orthonormal) view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

/// Rejected pose from [`Pose::validated`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PoseError {
    #[error("orientation quaternion is not unit length (length {length})")]
    NonUnitQuaternion { length: f32 },
    #[error("pose contains a non-finite component")]
    NonFinite,
}

impl Pose {
    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self {
            orientation,
            position,
        }
    }

    /// Build a pose from the raw arrays a host hands over: `[x, y, z, w]` and `[x, y, z]`.
    pub fn from_raw(orientation: [f32; 4], position: [f32; 3]) -> Self {
        Self {
            orientation: Quat::from_array(orientation),
            position: Vec3::from_array(position),
        }
    }

    /// Like [`Pose::from_raw`], but refuses orientations that are not unit length.
    pub fn validated(orientation: [f32; 4], position: [f32; 3]) -> Result<Self, PoseError> {
        let pose = Self::from_raw(orientation, position);
        if !pose.orientation.is_finite() || !pose.position.is_finite() {
            return Err(PoseError::NonFinite);
        }
        if !pose.has_unit_orientation() {
            return Err(PoseError::NonUnitQuaternion {
                length: pose.orientation.length(),
            });
        }
        Ok(pose)
    }

    pub fn has_unit_orientation(&self) -> bool {
        (self.orientation.length() - 1.0).abs() <= UNIT_TOLERANCE
    }
}

/// One eye-tracker sample from the host.
///
/// `pose` is the gaze ray in the same space as the head pose: the ray starts
/// at `pose.position` and points along the orientation's -Z. `ipd` is the
/// runtime inter-pupillary distance the tracker measured, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeGaze {
    pub pose: Pose,
    pub ipd: f32,
}

impl EyeGaze {
    pub fn new(pose: Pose, ipd: f32) -> Self {
        Self { pose, ipd }
    }

    /// Unit direction of the gaze ray.
    pub fn direction(&self) -> Vec3 {
        (self.pose.orientation * Vec3::NEG_Z).normalize_or_zero()
    }

    /// The measured IPD, if it is usable.
    pub fn valid_ipd(&self) -> Option<f32> {
        (self.ipd.is_finite() && self.ipd >= 0.0).then_some(self.ipd)
    }
}

/// Which eye a draw pass is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Draw order used by the frame loop.
    pub const ALL: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    /// Offset of this eye from the head center, in head space.
    pub fn offset(self, ipd: f32) -> Vec3 {
        let half = ipd / 2.0;
        match self {
            Eye::Left => Vec3::new(-half, 0.0, 0.0),
            Eye::Right => Vec3::new(half, 0.0, 0.0),
        }
    }
}

impl std::fmt::Display for Eye {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Eye::Left => f.write_str("left"),
            Eye::Right => f.write_str("right"),
        }
    }
}

/// Field of view given as four edge angles in degrees, measured from the view axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOfView {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl FieldOfView {
    pub fn symmetric(degrees: f32) -> Self {
        Self {
            left: degrees,
            right: degrees,
            bottom: degrees,
            top: degrees,
        }
    }

    pub fn edges(&self) -> [f32; 4] {
        [self.left, self.right, self.bottom, self.top]
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::symmetric(51.0)
    }
}
