//! Viewer configuration
//!
//! Stored as RON. Every field has a default, so a config file only needs
//! the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collision::{ColAABox, ResolverSettings, UNITS_PER_BLOCK};
use crate::math::Vec3;
use crate::rasterizer::{RasterSettings, HEIGHT, WIDTH};

/// Validation limits for values read from config files
pub mod limits {
    /// Largest framebuffer dimension
    pub const MAX_RESOLUTION: usize = 4096;
    /// Field of view range in degrees
    pub const MIN_FOV_DEGREES: f32 = 10.0;
    pub const MAX_FOV_DEGREES: f32 = 170.0;
    /// Largest speed, distance or size in world units
    pub const MAX_UNITS: f32 = 1_000_000.0;
    pub const MIN_BRIGHTNESS_LEVELS: u8 = 2;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Everything the viewer shell needs to start up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Framebuffer size in pixels
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view
    pub fov_degrees: f32,
    /// World units per second
    pub move_speed: f32,
    /// Radians per second
    pub turn_speed: f32,
    /// Downward acceleration, world units per second squared
    pub gravity: f32,
    pub max_step_height: f32,
    /// Collision box of the walking viewer
    pub entity: ColAABox,
    /// Camera height above the feet
    pub eye_height: f32,
    /// Meshes farther than this from the viewer are not collided with
    pub active_radius: f32,
    /// ASCII map to load instead of the built-in demo
    pub map: Option<PathBuf>,
    pub resolver: ResolverSettings,
    pub raster: RasterSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let u = UNITS_PER_BLOCK;
        Self {
            width: WIDTH,
            height: HEIGHT,
            fov_degrees: 90.0,
            move_speed: u * 2.0,
            turn_speed: 2.0,
            gravity: u * 8.0,
            max_step_height: u * 0.3,
            entity: ColAABox::new(
                Vec3::new(u * 0.2, u * 0.35, u * 0.2),
                Vec3::new(0.0, u * 0.35, 0.0),
            ),
            eye_height: u * 0.6,
            active_radius: u * 2.0,
            map: None,
            resolver: ResolverSettings::default(),
            raster: RasterSettings::default(),
        }
    }
}

fn check_units(name: &str, value: f32, allow_zero: bool) -> Result<(), String> {
    let in_range = value.is_finite() && value <= limits::MAX_UNITS && (value > 0.0 || (allow_zero && value == 0.0));
    if in_range {
        Ok(())
    } else {
        Err(format!("{} out of range: {}", name, value))
    }
}

impl ViewerConfig {
    /// Parse and validate a config from RON text
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());
        let ron_string = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    /// Reject values the viewer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::Validation)
    }

    fn check(&self) -> Result<(), String> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > limits::MAX_RESOLUTION {
                return Err(format!("{} out of range: {} (max {})", name, value, limits::MAX_RESOLUTION));
            }
        }
        if !(limits::MIN_FOV_DEGREES..=limits::MAX_FOV_DEGREES).contains(&self.fov_degrees) {
            return Err(format!("fov_degrees out of range: {}", self.fov_degrees));
        }

        check_units("move_speed", self.move_speed, true)?;
        check_units("turn_speed", self.turn_speed, true)?;
        check_units("gravity", self.gravity, true)?;
        check_units("max_step_height", self.max_step_height, true)?;
        check_units("eye_height", self.eye_height, true)?;
        check_units("active_radius", self.active_radius, false)?;
        check_units("resolver.units_per_block", self.resolver.units_per_block, false)?;
        for (axis, value) in ["x", "y", "z"].iter().zip([
            self.entity.max_dim.x,
            self.entity.max_dim.y,
            self.entity.max_dim.z,
        ]) {
            check_units(&format!("entity.max_dim.{}", axis), value, false)?;
        }
        let offset = self.entity.offs_to_centre;
        if ![offset.x, offset.y, offset.z].iter().all(|v| v.is_finite() && v.abs() <= limits::MAX_UNITS) {
            return Err(format!("entity.offs_to_centre out of range: {:?}", offset));
        }

        let raster = &self.raster;
        if !raster.near_plane.is_finite() || raster.near_plane <= 0.0 {
            return Err(format!("raster.near_plane must be positive: {}", raster.near_plane));
        }
        if raster.brightness_levels < limits::MIN_BRIGHTNESS_LEVELS {
            return Err(format!("raster.brightness_levels too small: {}", raster.brightness_levels));
        }
        if !(0.0..=1.0).contains(&raster.ambient) {
            return Err(format!("raster.ambient out of range: {}", raster.ambient));
        }
        Ok(())
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = ViewerConfig::from_ron_str("(width: 640, height: 480, fov_degrees: 75.0)").unwrap();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.fov_degrees, 75.0);
        assert_eq!(config.raster, RasterSettings::default());
        assert_eq!(config.map, None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        let mut config = ViewerConfig::default();
        config.move_speed = 123.0;
        config.map = Some(PathBuf::from("maps/hall.txt"));
        config.raster.backface_cull = false;
        config.save(&path).unwrap();

        let loaded = ViewerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ViewerConfig::from_ron_str("(width: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = ViewerConfig::from_ron_str("(fov_degrees: 200.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let mut config = ViewerConfig::default();
        config.entity.max_dim.y = 0.0;
        assert!(config.validate().is_err());

        config = ViewerConfig::default();
        config.raster.near_plane = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(ViewerConfig::from_ron_str("(width: "), Err(ConfigError::Parse(_))));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(ViewerConfig::load(dir.path().join("missing.ron")), Err(ConfigError::Io(_))));
    }
}
