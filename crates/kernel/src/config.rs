//! Tuning parameters for the whole simulation, loadable from YAML or JSON.

use glam::Vec3;
use labwalk_collision::{CollisionError, ResolveMode};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::path::Path;

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid obstacle: {0}")]
    Obstacle(#[from] CollisionError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub height: f32,
    pub radius: f32,
    pub gravity: f32,
    /// Foot position at scene start.
    pub spawn: Vec3,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            gravity: 9.8,
            spawn: Vec3::new(0.0, 0.0, -10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Top horizontal speed in units per second.
    pub speed: f32,
    /// Exponential rate at which velocity approaches the move target.
    pub acceleration: f32,
    /// Per-frame multiplier applied to horizontal velocity with no input.
    pub idle_damping: f32,
    /// Radians per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch_limit: f32,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            acceleration: 10.0,
            idle_damping: 0.85,
            mouse_sensitivity: 0.002,
            pitch_limit: FRAC_PI_4,
            initial_yaw: PI,
            initial_pitch: -0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Offset from the avatar head before yaw/pitch rotation.
    pub offset: Vec3,
    /// Exponential smoothing rate toward the target position.
    pub smoothness: f32,
    /// Fraction of avatar height the camera aims at.
    pub head_ratio: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 2.0, 5.0),
            smoothness: 10.0,
            head_ratio: 0.9,
            fov_degrees: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub position: Vec3,
    pub trigger_radius: f32,
    /// Seconds between the trigger and the start of the fade.
    pub open_delay: f32,
    /// Seconds the overlay takes to reach full opacity.
    pub fade_in: f32,
    /// Seconds between the start of the fade and the scene switch.
    pub fade_duration: f32,
    /// Leaf centre distance from the door axis when closed and open.
    pub leaf_closed_x: f32,
    pub leaf_open_x: f32,
    pub leaf_speed: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 12.0),
            trigger_radius: 4.0,
            open_delay: 2.0,
            fade_in: 1.0,
            fade_duration: 1.5,
            leaf_closed_x: 1.9,
            leaf_open_x: 5.0,
            leaf_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Seed for tree placement.
    pub seed: u64,
    /// Number of tree placement samples; samples on the path are dropped.
    pub tree_attempts: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tree_attempts: 30,
        }
    }
}

/// Top-level configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub avatar: AvatarConfig,
    pub controller: ControllerConfig,
    pub camera: CameraConfig,
    pub door: DoorConfig,
    pub layout: LayoutConfig,
    pub collision: ResolveMode,
}

impl SimConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("avatar.height", self.avatar.height),
            ("avatar.radius", self.avatar.radius),
            ("controller.speed", self.controller.speed),
            ("controller.acceleration", self.controller.acceleration),
            ("camera.smoothness", self.camera.smoothness),
            ("camera.fov_degrees", self.camera.fov_degrees),
            ("door.trigger_radius", self.door.trigger_radius),
            ("door.fade_in", self.door.fade_in),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("avatar.gravity", self.avatar.gravity),
            ("controller.mouse_sensitivity", self.controller.mouse_sensitivity),
            ("door.open_delay", self.door.open_delay),
            ("door.fade_duration", self.door.fade_duration),
            ("door.leaf_speed", self.door.leaf_speed),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        let finite = [
            ("controller.initial_yaw", self.controller.initial_yaw),
            ("controller.initial_pitch", self.controller.initial_pitch),
            ("door.leaf_closed_x", self.door.leaf_closed_x),
            ("door.leaf_open_x", self.door.leaf_open_x),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let finite_vectors = [
            ("camera.offset", self.camera.offset),
            ("door.position", self.door.position),
        ];
        for (name, value) in finite_vectors {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let head_ratio = self.camera.head_ratio;
        if !(head_ratio.is_finite() && head_ratio >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.head_ratio must be non-negative, got {head_ratio}"
            )));
        }

        let damping = self.controller.idle_damping;
        if !(0.0..=1.0).contains(&damping) {
            return Err(ConfigError::Invalid(format!(
                "controller.idle_damping must be in [0, 1], got {damping}"
            )));
        }
        let limit = self.controller.pitch_limit;
        if !(limit > 0.0 && limit < FRAC_PI_2) {
            return Err(ConfigError::Invalid(format!(
                "controller.pitch_limit must be in (0, pi/2), got {limit}"
            )));
        }
        if !self.avatar.spawn.is_finite() || self.avatar.spawn.y < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "avatar.spawn must be finite and above ground, got {}",
                self.avatar.spawn
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = SimConfig::from_yaml_str(
            "controller:\n  speed: 7.5\ncollision: accumulate\n",
        )
        .unwrap();
        assert_eq!(config.controller.speed, 7.5);
        assert_eq!(config.controller.idle_damping, 0.85);
        assert_eq!(config.collision, ResolveMode::Accumulate);
        assert_eq!(config.door, DoorConfig::default());
    }

    #[test]
    fn json_vectors_are_arrays() {
        let config =
            SimConfig::from_json_str(r#"{"avatar": {"spawn": [1.0, 0.0, 2.0]}}"#).unwrap();
        assert_eq!(config.avatar.spawn, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let mut config = SimConfig::default();
        config.layout.seed = 7;
        let text = config.to_yaml_string().unwrap();
        assert_eq!(SimConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_non_positive_radius() {
        let err = SimConfig::from_yaml_str("avatar:\n  radius: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("avatar.radius")));
    }

    #[test]
    fn rejects_pitch_limit_past_vertical() {
        let mut config = SimConfig::default();
        config.controller.pitch_limit = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_damping_out_of_range() {
        let mut config = SimConfig::default();
        config.controller.idle_damping = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_angles_and_offsets() {
        for (yaml, field) in [
            ("controller:\n  initial_yaw: .nan\n", "controller.initial_yaw"),
            ("controller:\n  initial_pitch: .inf\n", "controller.initial_pitch"),
            ("camera:\n  offset: [0.0, .nan, 5.0]\n", "camera.offset"),
            ("camera:\n  head_ratio: .inf\n", "camera.head_ratio"),
            ("door:\n  position: [.inf, 0.0, 12.0]\n", "door.position"),
            ("door:\n  leaf_closed_x: .nan\n", "door.leaf_closed_x"),
            ("door:\n  leaf_open_x: -.inf\n", "door.leaf_open_x"),
        ] {
            let err = SimConfig::from_yaml_str(yaml).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid(msg) if msg.contains(field)),
                "{yaml:?} gave {err}"
            );
        }

        let mut config = SimConfig::default();
        config.camera.head_ratio = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("lab.yaml");
        std::fs::File::create(&yaml)
            .unwrap()
            .write_all(b"door:\n  trigger_radius: 6.0\n")
            .unwrap();
        assert_eq!(SimConfig::load(&yaml).unwrap().door.trigger_radius, 6.0);

        let json = dir.path().join("lab.json");
        std::fs::write(&json, r#"{"layout": {"tree_attempts": 3}}"#).unwrap();
        assert_eq!(SimConfig::load(&json).unwrap().layout.tree_attempts, 3);

        let toml = dir.path().join("lab.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(
            SimConfig::load(&toml),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
