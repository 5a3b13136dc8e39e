//! Scene configuration.
//!
//! Every field has a default matching the stock solar system, and missing
//! JSON fields fall back to those defaults, so a config file only needs the
//! values it changes.

use crate::geometry::{sphere_vertex_count, MAX_SPHERE_VERTICES};
use crate::math::Vector3;
use crate::objects::{BODY_HIGHLIGHT, FALLBACK_LIGHT, SUN_HIGHLIGHT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a [`SceneConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for a config.
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// The moon refers to a planet that does not exist.
    #[error("Moon parent {parent} is out of range for {planets} planets")]
    MoonParent {
        /// Configured parent index.
        parent: usize,
        /// Number of planets.
        planets: usize,
    },

    /// The sphere tessellation does not fit `u16` indices.
    #[error("Sphere tessellation {stacks}x{slices} needs more than 65536 vertices")]
    SphereTooDense {
        /// Configured latitude bands.
        stacks: u32,
        /// Configured longitude segments.
        slices: u32,
    },
}

/// Camera placement and perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position.
    pub eye: Vector3,
    /// Look-at target.
    pub target: Vector3,
    /// Up vector.
    pub up: Vector3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vector3::new(0.0, 3.0, 8.0),
            target: Vector3::ZERO,
            up: Vector3::UP,
            // frustum(-aspect, aspect, -1, 1, 1, 100)
            fov_y_degrees: 90.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

/// The central star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Radius.
    pub radius: f32,
    /// Self-rotation per frame, degrees.
    pub spin_increment: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            radius: 0.6,
            spin_increment: 0.2,
        }
    }
}

/// One planet on the shared orbital plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    /// Radius.
    pub radius: f32,
    /// Distance from the sun.
    pub distance: f32,
    /// Orbit advance per frame, degrees.
    pub increment: f32,
}

/// The satellite of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    /// Index of the planet it orbits.
    pub parent: usize,
    /// Radius.
    pub radius: f32,
    /// Distance from the parent.
    pub distance: f32,
    /// Orbit advance per frame, degrees.
    pub increment: f32,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            parent: 2,
            radius: 0.1,
            distance: 0.7,
            increment: 1.0,
        }
    }
}

/// The drifting sprite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Starting position. `z` never changes.
    pub position: Vector3,
    /// Starting velocity in X and Y per frame.
    pub velocity: [f32; 2],
    /// Velocity flips once `|x|` or `|y|` exceeds these.
    pub bounds: [f32; 2],
    /// Chance per frame of a random velocity nudge.
    pub perturb_probability: f32,
    /// Largest nudge per component.
    pub perturb_magnitude: f32,
    /// Tilt about X, degrees.
    pub tilt_degrees: f32,
    /// Spin about Z relative to the sun's angle.
    pub spin_ratio: f32,
    /// Uniform scale of the unit quad.
    pub size: f32,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, -5.0),
            velocity: [0.015, 0.01],
            bounds: [8.0, 5.0],
            perturb_probability: 0.005,
            perturb_magnitude: 0.005,
            tilt_degrees: 60.0,
            spin_ratio: 0.5,
            size: 1.0,
        }
    }
}

/// Selection highlight appearance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Cube edge relative to the body radius.
    pub scale_factor: f32,
    /// Tint around the sun.
    pub sun_color: [f32; 4],
    /// Tint around planets and the moon.
    pub body_color: [f32; 4],
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.8,
            sun_color: SUN_HIGHLIGHT,
            body_color: BODY_HIGHLIGHT,
        }
    }
}

/// Phong light placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// World-space light position.
    pub position: Vector3,
    /// Object-space light used when a model matrix is singular.
    pub fallback: Vector3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            position: Vector3::new(5.0, 5.0, 5.0),
            fallback: FALLBACK_LIGHT,
        }
    }
}

/// The single-body detail view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// Eye position; the camera looks at the origin.
    pub eye: Vector3,
    /// Sphere radius.
    pub radius: f32,
    /// Self-rotation per frame, degrees.
    pub spin_increment: f32,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            eye: Vector3::new(0.0, 0.0, 3.0),
            radius: 1.0,
            spin_increment: 0.5,
        }
    }
}

/// Everything tunable about the scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Clear color.
    pub clear_color: [f32; 4],
    /// Galaxy camera.
    pub camera: CameraConfig,
    /// Inclination of the orbital plane about X, degrees.
    pub orbit_tilt_degrees: f32,
    /// Sphere latitude bands.
    pub sphere_stacks: u32,
    /// Sphere longitude segments.
    pub sphere_slices: u32,
    /// Draw planets and the moon with Phong lighting. The sun is always flat.
    pub lit_bodies: bool,
    /// The sun.
    pub sun: SunConfig,
    /// Planets, innermost first.
    pub planets: Vec<PlanetConfig>,
    /// The moon.
    pub moon: MoonConfig,
    /// The drifting sprite.
    pub sprite: SpriteConfig,
    /// Selection highlight.
    pub highlight: HighlightConfig,
    /// Phong light.
    pub lighting: LightingConfig,
    /// Detail view.
    pub detail: DetailConfig,
    /// Seed for the sprite's random walk. Unseeded if absent.
    pub seed: Option<u64>,
}

/// Planet radii, innermost first.
pub const PLANET_RADII: [f32; 8] = [0.2, 0.35, 0.5, 0.3, 1.0, 0.85, 0.6, 0.5];

/// Planet orbit distances, innermost first.
pub const PLANET_DISTANCES: [f32; 8] = [0.95, 1.4, 2.0, 2.5, 3.5, 4.5, 5.2, 5.8];

impl Default for SceneConfig {
    fn default() -> Self {
        let planets = PLANET_RADII
            .iter()
            .zip(PLANET_DISTANCES)
            .enumerate()
            .map(|(i, (&radius, distance))| PlanetConfig {
                radius,
                distance,
                increment: (i + 1) as f32 * 0.3,
            })
            .collect();

        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            camera: CameraConfig::default(),
            orbit_tilt_degrees: 30.0,
            sphere_stacks: 48,
            sphere_slices: 48,
            lit_bodies: true,
            sun: SunConfig::default(),
            planets,
            moon: MoonConfig::default(),
            sprite: SpriteConfig::default(),
            highlight: HighlightConfig::default(),
            lighting: LightingConfig::default(),
            detail: DetailConfig::default(),
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moon.parent >= self.planets.len() {
            return Err(ConfigError::MoonParent {
                parent: self.moon.parent,
                planets: self.planets.len(),
            });
        }
        if sphere_vertex_count(self.sphere_stacks, self.sphere_slices) > MAX_SPHERE_VERTICES {
            return Err(ConfigError::SphereTooDense {
                stacks: self.sphere_stacks,
                slices: self.sphere_slices,
            });
        }
        Ok(())
    }

    /// Number of selectable bodies: sun, planets, moon.
    #[inline]
    pub fn body_count(&self) -> usize {
        self.planets.len() + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.planets.len(), 8);
        assert_eq!(config.body_count(), 10);
        assert!((config.planets[7].increment - 2.4).abs() < 1e-6);
        assert_eq!(config.planets[2].distance, 2.0);
        assert_eq!(config.moon.parent, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "orbit_tilt_degrees": 10.0, "sun": { "radius": 1.5 } }"#).unwrap();
        assert_eq!(config.orbit_tilt_degrees, 10.0);
        assert_eq!(config.sun.radius, 1.5);
        assert_eq!(config.sun.spin_increment, 0.2);
        assert_eq!(config.planets.len(), 8);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SceneConfig {
            seed: Some(7),
            ..Default::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_bad_moon_parent() {
        let err = SceneConfig::from_json_str(r#"{ "planets": [], "moon": { "parent": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::MoonParent { parent: 0, planets: 0 }));
    }

    #[test]
    fn test_sphere_too_dense() {
        let err = SceneConfig::from_json_str(r#"{ "sphere_stacks": 300, "sphere_slices": 300 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SphereTooDense { stacks: 300, slices: 300 }));

        let config = SceneConfig::from_json_str(r#"{ "sphere_stacks": 255, "sphere_slices": 255 }"#).unwrap();
        assert_eq!(config.sphere_stacks, 255);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(SceneConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SceneConfig::from_path("/nonexistent/orrery.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
