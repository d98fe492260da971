//! Viewer configuration.
//!
//! Everything here can be loaded from a JSON file. Every field has a default,
//! so a config file only needs the values it changes:
//!
//! ```json
//! {
//!     "theme": "light",
//!     "simulation": { "seed": 42, "spin_coupling": "per_second" },
//!     "scene": { "asteroid_count": 1000 }
//! }
//! ```
//!
//! A file that cannot be read or parsed, or that holds an out-of-range scene
//! or camera value or an invalid body table, is an error. Nothing is rendered from a partially valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bodies::{BodyDescriptor, Registry};
use crate::error::{ConfigError, RegistryError};
use crate::gpu::mesh::{MAX_RING_SEGMENTS, MAX_SPHERE_SEGMENTS};

/// Most stars or asteroids a scene may scatter.
pub const MAX_SCATTER_COUNT: u32 = 1_000_000;

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and non-negative"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and positive"))
    }
}

/// How the per-frame spin increment relates to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinCoupling {
    /// `spin += spin_speed * global_speed` once per frame, so spin rate
    /// follows the display refresh rate.
    #[default]
    PerFrame,
    /// `spin += spin_speed * global_speed * delta`, independent of frame rate.
    PerSecond,
}

/// Background color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Scene background (and fog) color as `0xRRGGBB`.
    pub fn background(self) -> u32 {
        match self {
            Theme::Dark => 0x0A0E17,
            Theme::Light => 0xF0F8FF,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Helios - Solar System".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Limits and rates for the simulation core.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    /// Upper bound for a body's orbital speed (rad/s).
    pub max_body_speed: f32,
    /// Lower bound for the global speed multiplier. Must be positive.
    pub min_global_speed: f32,
    /// Upper bound for the global speed multiplier.
    pub max_global_speed: f32,
    /// Star rotation per frame at 1x speed. Keeps running while paused.
    pub star_spin_rate: f32,
    pub spin_coupling: SpinCoupling,
    /// Start planets at random orbit angles instead of all lined up.
    pub randomize_angles: bool,
    /// Seed for initial angles and scene scatter. Random when `None`.
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_body_speed: 0.2,
            min_global_speed: 0.1,
            max_global_speed: 2.0,
            star_spin_rate: 0.001,
            spin_coupling: SpinCoupling::PerFrame,
            randomize_angles: true,
            seed: None,
        }
    }
}

impl SimulationSettings {
    /// Copy with bounds forced into a usable shape: non-negative body speed
    /// limit, positive global minimum, maximum not below minimum.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };

        let max_body_speed = finite_or(self.max_body_speed, defaults.max_body_speed).max(0.0);
        let mut min_global_speed = finite_or(self.min_global_speed, defaults.min_global_speed);
        if min_global_speed <= 0.0 {
            min_global_speed = defaults.min_global_speed;
        }
        let max_global_speed =
            finite_or(self.max_global_speed, defaults.max_global_speed).max(min_global_speed);

        Self {
            max_body_speed,
            min_global_speed,
            max_global_speed,
            star_spin_rate: finite_or(self.star_spin_rate, defaults.star_spin_rate),
            ..self.clone()
        }
    }
}

/// Decorative scene content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub star_count: u32,
    /// Side length of the cube the stars are scattered in.
    pub star_extent: f32,
    pub star_size: f32,
    pub asteroid_count: u32,
    pub asteroid_inner_radius: f32,
    pub asteroid_outer_radius: f32,
    /// Total vertical spread of the belt.
    pub asteroid_height: f32,
    pub fog_density: f32,
    pub sphere_segments: u32,
    pub ring_segments: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 10_000,
            star_extent: 2000.0,
            star_size: 1.5,
            asteroid_count: 500,
            asteroid_inner_radius: 60.0,
            asteroid_outer_radius: 70.0,
            asteroid_height: 2.0,
            fog_density: 0.002,
            sphere_segments: 32,
            ring_segments: 128,
        }
    }
}

impl SceneConfig {
    /// Reject values the scene generator or mesh builder cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.star_count > MAX_SCATTER_COUNT {
            return Err(invalid("scene.star_count", "exceeds 1000000"));
        }
        if self.asteroid_count > MAX_SCATTER_COUNT {
            return Err(invalid("scene.asteroid_count", "exceeds 1000000"));
        }
        non_negative("scene.star_extent", self.star_extent)?;
        positive("scene.star_size", self.star_size)?;
        non_negative("scene.asteroid_inner_radius", self.asteroid_inner_radius)?;
        non_negative("scene.asteroid_outer_radius", self.asteroid_outer_radius)?;
        non_negative("scene.asteroid_height", self.asteroid_height)?;
        non_negative("scene.fog_density", self.fog_density)?;
        if !(3..=MAX_SPHERE_SEGMENTS).contains(&self.sphere_segments) {
            return Err(invalid("scene.sphere_segments", "must be between 3 and 512"));
        }
        if !(3..=MAX_RING_SEGMENTS).contains(&self.ring_segments) {
            return Err(invalid("scene.ring_segments", "must be between 3 and 4096"));
        }
        Ok(())
    }
}

/// Initial orbit camera placement and projection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        // Equivalent to sitting at (0, 30, 100) looking at the sun.
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            distance: (30.0f32 * 30.0 + 100.0 * 100.0).sqrt(),
            pitch: (30.0f32 / 100.0).atan(),
            yaw: 0.0,
            min_distance: 15.0,
            max_distance: 800.0,
        }
    }
}

impl CameraConfig {
    /// Reject projections and orbit limits the camera cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("camera.fov_degrees", "must be between 0 and 180 exclusive"));
        }
        positive("camera.near", self.near)?;
        positive("camera.far", self.far)?;
        if self.far <= self.near {
            return Err(invalid("camera.far", "must be greater than near"));
        }
        positive("camera.min_distance", self.min_distance)?;
        positive("camera.max_distance", self.max_distance)?;
        if self.max_distance < self.min_distance {
            return Err(invalid("camera.max_distance", "must not be below min_distance"));
        }
        positive("camera.distance", self.distance)?;
        if !self.pitch.is_finite() {
            return Err(invalid("camera.pitch", "must be finite"));
        }
        if !self.yaw.is_finite() {
            return Err(invalid("camera.yaw", "must be finite"));
        }
        Ok(())
    }
}

/// Complete viewer configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub simulation: SimulationSettings,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub theme: Theme,
    /// Custom body table. The built-in solar system when absent.
    pub bodies: Option<Vec<BodyDescriptor>>,
}

impl AppConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.scene.validate()?;
        config.camera.validate()?;
        config.registry()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Build the body registry this configuration describes.
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        match &self.bodies {
            Some(bodies) => Registry::new(bodies.clone()),
            None => Ok(Registry::solar_system()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.registry().unwrap(), Registry::solar_system());
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_json(
            r#"{ "theme": "light", "simulation": { "seed": 42, "spin_coupling": "per_second" } }"#,
        )
        .unwrap();
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.spin_coupling, SpinCoupling::PerSecond);
        assert_eq!(config.simulation.max_body_speed, 0.2);
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn test_invalid_json_fails() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_bodies_fail_closed() {
        let result = AppConfig::from_json(r#"{ "bodies": [] }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Registry(RegistryError::Empty))
        ));
    }

    #[test]
    fn test_unusable_scene_values_fail_closed() {
        // 1e39 overflows f32 to infinity
        let result = AppConfig::from_json(r#"{ "scene": { "star_extent": 1e39 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "scene.star_extent", .. })
        ));

        let result = AppConfig::from_json(r#"{ "scene": { "sphere_segments": 100000 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "scene.sphere_segments", .. })
        ));

        let result = AppConfig::from_json(r#"{ "scene": { "fog_density": -0.5 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "scene.fog_density", .. })
        ));

        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unusable_camera_values_fail_closed() {
        let result = AppConfig::from_json(r#"{ "camera": { "near": 10.0, "far": 5.0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "camera.far", .. })
        ));

        let result = AppConfig::from_json(r#"{ "camera": { "fov_degrees": 180.0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "camera.fov_degrees", .. })
        ));

        let result =
            AppConfig::from_json(r#"{ "camera": { "min_distance": 50.0, "max_distance": 20.0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "camera.max_distance", .. })
        ));

        assert!(CameraConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            AppConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("helios-config-{}.json", std::process::id()));
        let mut config = AppConfig::default();
        config.theme = Theme::Light;
        config.scene.asteroid_count = 12;

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_sanitized_settings() {
        let settings = SimulationSettings {
            max_body_speed: -1.0,
            min_global_speed: 0.0,
            max_global_speed: 0.01,
            star_spin_rate: f32::NAN,
            ..SimulationSettings::default()
        }
        .sanitized();

        assert_eq!(settings.max_body_speed, 0.0);
        assert_eq!(settings.min_global_speed, 0.1);
        assert_eq!(settings.max_global_speed, 0.1);
        assert_eq!(settings.star_spin_rate, 0.001);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.background(), 0x0A0E17);
        assert_eq!(Theme::Light.background(), 0xF0F8FF);
    }
}
