use std::path::Path;

use gazehunt_common::FieldOfView;
use gazehunt_pose::GazeCone;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half the distance at which the cube sits in front of the user.
const MAX_MODEL_DISTANCE: f32 = 17.0;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Clip planes and field of view for the per-eye projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
    pub fov: FieldOfView,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
            fov: FieldOfView::default(),
        }
    }
}

/// Per-frame spin applied to the cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub step_degrees: f32,
    /// Only the direction is used; see `gazehunt_pose::rotate`.
    pub axis: Vec3,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            step_degrees: 1.3,
            axis: Vec3::new(0.5, 0.5, 1.0),
        }
    }
}

/// Every constant the scene uses. Defaults reproduce the stock sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub projection: ProjectionConfig,
    pub gaze: GazeCone,
    pub rotation: RotationConfig,
    /// Z of the look-at camera eye; it looks back at the origin.
    pub camera_z: f32,
    /// Light position in world space.
    pub light_position: Vec3,
    /// Where the cube is placed at startup and on reset.
    pub cube_position: Vec3,
    /// How far below the user the floor is.
    pub floor_depth: f32,
    /// Inter-pupillary distance. Zero renders both eyes from the head center.
    pub ipd: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            gaze: GazeCone::default(),
            rotation: RotationConfig::default(),
            camera_z: 0.01,
            light_position: Vec3::new(0.0, 2.0, 0.0),
            cube_position: Vec3::new(0.0, 0.0, -MAX_MODEL_DISTANCE / 2.0),
            floor_depth: 40.0,
            ipd: 0.0,
        }
    }
}

impl SceneConfig {
    /// Parse YAML. Missing keys fall back to defaults. The result is validated.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !(p.near.is_finite() && p.near > 0.0) {
            return Err(invalid("projection.near", format!("must be > 0, got {}", p.near)));
        }
        if !(p.far.is_finite() && p.far > p.near) {
            return Err(invalid(
                "projection.far",
                format!("must be > near ({}), got {}", p.near, p.far),
            ));
        }
        for (name, angle) in ["left", "right", "bottom", "top"].into_iter().zip(p.fov.edges()) {
            if !(angle > 0.0 && angle < 90.0) {
                return Err(invalid(
                    "projection.fov",
                    format!("{name} must be in (0, 90) degrees, got {angle}"),
                ));
            }
        }
        if !(self.gaze.pitch_limit.is_finite() && self.gaze.pitch_limit > 0.0) {
            return Err(invalid("gaze.pitch_limit", "must be > 0"));
        }
        if !(self.gaze.yaw_limit.is_finite() && self.gaze.yaw_limit > 0.0) {
            return Err(invalid("gaze.yaw_limit", "must be > 0"));
        }
        if !self.rotation.step_degrees.is_finite() {
            return Err(invalid("rotation.step_degrees", "must be finite"));
        }
        if !(self.rotation.axis.is_finite() && self.rotation.axis.length_squared() > 0.0) {
            return Err(invalid("rotation.axis", "must be a finite, non-zero vector"));
        }
        if !(self.ipd.is_finite() && self.ipd >= 0.0) {
            return Err(invalid("ipd", format!("must be >= 0, got {}", self.ipd)));
        }
        if !(self.camera_z.is_finite()
            && self.floor_depth.is_finite()
            && self.light_position.is_finite()
            && self.cube_position.is_finite())
        {
            return Err(invalid("scene", "positions must be finite"));
        }
        Ok(())
    }
}
