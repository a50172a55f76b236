use gazehunt_common::{FieldOfView, Pose};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Rejected frustum parameters.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("frustum has zero width (left == right == {0})")]
    ZeroWidth(f32),
    #[error("frustum has zero height (bottom == top == {0})")]
    ZeroHeight(f32),
    #[error("frustum has zero depth (near == far == {0})")]
    ZeroDepth(f32),
    #[error("clip planes must be positive (near={near}, far={far})")]
    NonPositivePlane { near: f32, far: f32 },
}

/// Expand a quaternion `(x, y, z, w)` into a 4x4 rotation matrix.
///
/// The layout is the transpose of the usual rotation matrix, so for a unit
/// quaternion the result rotates by `q.conjugate()`: it takes world directions
/// into head space. Translation is zero and the last row is `(0, 0, 0, 1)`.
///
/// No normalization happens here. The caller owns the unit-length invariant.
pub fn quat_to_matrix(q: Quat) -> Mat4 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let ww = w * w;
    let xx = x * x;
    let yy = y * y;
    let zz = z * z;

    #[rustfmt::skip]
    let m = [
        ww + xx - yy - zz,     2.0 * (x * y - w * z), 2.0 * (x * z + w * y), 0.0,
        2.0 * (x * y + w * z), ww - xx + yy - zz,     2.0 * (y * z - w * x), 0.0,
        2.0 * (x * z - w * y), 2.0 * (y * z + w * x), ww - xx - yy + zz,     0.0,
        0.0,                   0.0,                   0.0,                   1.0,
    ];
    Mat4::from_cols_array(&m)
}

/// Off-axis perspective matrix from explicit near-plane extents (OpenGL clip space).
pub fn frustum(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Result<Mat4, ProjectionError> {
    if left == right {
        return Err(ProjectionError::ZeroWidth(left));
    }
    if bottom == top {
        return Err(ProjectionError::ZeroHeight(bottom));
    }
    if near == far {
        return Err(ProjectionError::ZeroDepth(near));
    }
    if near <= 0.0 || far <= 0.0 {
        return Err(ProjectionError::NonPositivePlane { near, far });
    }

    let r_width = 1.0 / (right - left);
    let r_height = 1.0 / (top - bottom);
    let r_depth = 1.0 / (near - far);

    Ok(Mat4::from_cols(
        Vec4::new(2.0 * near * r_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * r_height, 0.0, 0.0),
        Vec4::new(
            (right + left) * r_width,
            (top + bottom) * r_height,
            (far + near) * r_depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, 2.0 * far * near * r_depth, 0.0),
    ))
}

/// Projection from four edge angles: each angle becomes a tangent-scaled offset
/// at the near plane, then goes through [`frustum`].
pub fn perspective(near: f32, far: f32, fov: &FieldOfView) -> Result<Mat4, ProjectionError> {
    let tan = |degrees: f32| (degrees as f64).to_radians().tan() as f32;
    let l = -tan(fov.left) * near;
    let r = tan(fov.right) * near;
    let b = -tan(fov.bottom) * near;
    let t = tan(fov.top) * near;
    frustum(l, r, b, t, near, far)
}

pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, center, up)
}

/// Post-multiply `m` by a rotation of `degrees` about `axis`.
///
/// The axis is normalized first, so only its direction matters. A zero axis
/// leaves `m` untouched.
pub fn rotate(m: Mat4, degrees: f32, axis: Vec3) -> Mat4 {
    let Some(axis) = axis.try_normalize() else {
        tracing::warn!("rotate called with a zero axis; matrix left unchanged");
        return m;
    };
    m * Mat4::from_axis_angle(axis, degrees.to_radians())
}

/// Post-multiply `m` by a translation.
pub fn translate(m: Mat4, offset: Vec3) -> Mat4 {
    m * Mat4::from_translation(offset)
}

/// Head view for a pose: orientation expanded by [`quat_to_matrix`], then
/// translated by the pose position.
pub fn head_view(pose: &Pose) -> Mat4 {
    translate(quat_to_matrix(pose.orientation), pose.position)
}
