use std::f32::consts::FRAC_PI_2;

use gazehunt_common::FieldOfView;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Angular position of an object relative to the head's forward axis (-Z), in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeAngles {
    pub pitch: f32,
    pub yaw: f32,
}

/// Half-angles of the cone the object has to sit in to count as "looked at".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeCone {
    pub pitch_limit: f32,
    pub yaw_limit: f32,
}

impl Default for GazeCone {
    fn default() -> Self {
        Self {
            pitch_limit: 0.12,
            yaw_limit: 0.12,
        }
    }
}

impl GazeCone {
    /// Strict comparison on both axes; there is no hysteresis.
    pub fn contains(&self, angles: GazeAngles) -> bool {
        angles.pitch.abs() < self.pitch_limit && angles.yaw.abs() < self.yaw_limit
    }
}

/// Where an object's origin sits, angularly, once moved into head space.
pub fn gaze_angles(head_view: Mat4, model: Mat4) -> GazeAngles {
    let p = (head_view * model) * Vec4::W;
    GazeAngles {
        pitch: p.y.atan2(-p.z),
        yaw: p.x.atan2(-p.z),
    }
}

/// Whether the object with `model` lies inside `cone` around the head's forward axis.
pub fn is_looking_at(head_view: Mat4, model: Mat4, cone: &GazeCone) -> bool {
    cone.contains(gaze_angles(head_view, model))
}

/// Signed angle between `vector` and the plane through the origin with
/// `normal`, in radians. Positive on the side the normal points to.
///
/// Zero-length input has no direction and yields 0.
pub fn angle_to_plane(vector: Vec3, normal: Vec3) -> f32 {
    if vector.length_squared() == 0.0 || normal.length_squared() == 0.0 {
        return 0.0;
    }
    FRAC_PI_2 - vector.angle_between(normal)
}

/// Angles of a gaze direction against a view's YOZ plane (yaw) and XOZ
/// plane (pitch). `view_orientation` is the orientation of the viewer whose
/// forward axis is -Z.
pub fn ray_angles(direction: Vec3, view_orientation: Quat) -> GazeAngles {
    GazeAngles {
        pitch: angle_to_plane(direction, view_orientation * Vec3::Y),
        yaw: angle_to_plane(direction, view_orientation * Vec3::X),
    }
}

/// Where a gaze lands on an eye image, as fractions of width and height from
/// the top-left corner. Straight ahead is (0.5, 0.5); the edges of `fov` map
/// to 0 and 1.
pub fn screen_point(angles: GazeAngles, fov: &FieldOfView) -> Vec2 {
    let tan = |degrees: f32| degrees.to_radians().tan();
    let half_width = if angles.yaw < 0.0 { tan(fov.left) } else { tan(fov.right) };
    let half_height = if angles.pitch > 0.0 { tan(fov.top) } else { tan(fov.bottom) };
    Vec2::new(
        0.5 + 0.5 * angles.yaw.tan() / half_width,
        0.5 - 0.5 * angles.pitch.tan() / half_height,
    )
}
