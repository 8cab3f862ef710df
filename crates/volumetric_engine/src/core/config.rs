//! # Viewer Configuration
//!
//! Top-level configuration for the volumetric viewer. Defaults reproduce the
//! stock scene: an isosurface cube lit by one orbiting point light, seen from a
//! camera at (1, 1.5, 4) on a pale blue background.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, headless frame count and timestep
//! - **Shader Config**: where GPU program sources live
//! - **Camera Config**: initial viewer placement and projection bounds
//! - **Lighting Config**: ambient and background colors of the frame state
//! - **Scene Config**: which technique the demo scene showcases

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Core behavior: logging and the fixed timestep used by the headless driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log level (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Number of frames the headless driver renders
    pub frames: u32,
    /// Simulated seconds per frame
    pub frame_time: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frames: 240,
            frame_time: 1.0 / 60.0,
        }
    }
}

/// # Shader Configuration
///
/// Program sources are looked up relative to this directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory holding the vertex/fragment program sources
    pub directory: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            directory: "res/shaders".to_string(),
        }
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space
    pub eye: [f32; 3],
    /// Look-at target in world space
    pub target: [f32; 3],
    /// Up vector
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Viewport aspect ratio
    pub aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Smallest field of view reachable by zooming
    pub min_fov_degrees: f32,
    /// Largest field of view reachable by zooming
    pub max_fov_degrees: f32,
    /// Field of view change per scroll notch
    pub zoom_step_degrees: f32,
    /// Scroll notches applied at startup, positive zooms in
    pub initial_scroll: i32,
    /// Yaw speed of the camera around its target in radians per second
    pub orbit_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [1.0, 1.5, 4.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
            min_fov_degrees: 10.0,
            max_fov_degrees: 110.0,
            zoom_step_degrees: 4.0,
            initial_scroll: 0,
            orbit_speed: 0.0,
        }
    }
}

/// # Lighting Configuration
///
/// Global illumination terms of the frame state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Ambient light color (RGBA)
    pub ambient: [f32; 4],
    /// Background / clear color (RGBA)
    pub background: [f32; 4],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0, 1.0],
            background: [219.0 / 255.0, 237.0 / 255.0, 242.0 / 255.0, 1.0],
        }
    }
}

/// Rendering technique showcased by the demo scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneTechnique {
    /// Unlit flat color
    Flat,
    /// Multi-light Phong-like shading
    Standard,
    /// Absorption / emission-absorption volume
    Volume,
    /// Scattering volume with a selectable density source
    TexturedVolume,
    /// Ray-marched isosurface
    Isosurface,
}

/// # Scene Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Technique of the showcased node
    pub technique: SceneTechnique,
    /// Base color of the showcased material (RGBA)
    pub color: [f32; 4],
    /// Whether a point light orbits the scene
    pub orbiting_light: bool,
    /// Intensity of the orbiting light
    pub light_intensity: f32,
    /// Radius of the light orbit
    pub orbit_radius: f32,
    /// Height of the light orbit
    pub orbit_height: f32,
    /// Angular speed of the light orbit in radians per second
    pub orbit_speed: f32,
    /// Draw a wireframe overlay on nodes that support it
    pub show_wireframe: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            technique: SceneTechnique::Isosurface,
            color: [0.0, 1.0, 0.0, 1.0],
            orbiting_light: true,
            light_intensity: 3.0,
            orbit_radius: 4.0,
            orbit_height: 1.0,
            orbit_speed: 1.0 / 3.0,
            show_wireframe: false,
        }
    }
}

/// # Complete Viewer Configuration
///
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Shader lookup configuration
    pub shaders: ShaderConfig,
    /// Initial camera
    pub camera: CameraConfig,
    /// Frame lighting
    pub lighting: LightingConfig,
    /// Demo scene
    pub scene: SceneConfig,
}

impl ViewerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shaders.directory.trim().is_empty() {
            return Err(ConfigError::Invalid("Shader directory cannot be empty".to_string()));
        }

        let camera = &self.camera;
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(ConfigError::Invalid(format!(
                "Clipping planes must satisfy 0 < near < far (near = {}, far = {})",
                camera.near, camera.far
            )));
        }

        if camera.min_fov_degrees > camera.max_fov_degrees {
            return Err(ConfigError::Invalid(format!(
                "min_fov_degrees ({}) exceeds max_fov_degrees ({})",
                camera.min_fov_degrees, camera.max_fov_degrees
            )));
        }

        if self.engine.frames == 0 {
            return Err(ConfigError::Invalid("Frame count must be at least 1".to_string()));
        }

        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scene.technique, SceneTechnique::Isosurface);
        assert_eq!(config.camera.eye, [1.0, 1.5, 4.0]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let text = r#"
            [scene]
            technique = "volume"
            show_wireframe = true

            [lighting]
            ambient = [0.2, 0.2, 0.2, 1.0]
        "#;

        let config: ViewerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.scene.technique, SceneTechnique::Volume);
        assert_eq!(config.camera.initial_scroll, 0);
        assert!(config.scene.show_wireframe);
        assert_eq!(config.lighting.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(config.shaders.directory, "res/shaders");
        assert_eq!(config.engine.frames, 240);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let file = format!("volumetric_viewer_{}.ron", std::process::id());
        let path = std::env::temp_dir().join(file);
        let mut config = ViewerConfig::default();
        config.scene.technique = SceneTechnique::TexturedVolume;
        config.engine.frames = 12;

        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.scene.technique, SceneTechnique::TexturedVolume);
        assert_eq!(loaded.engine.frames, 12);
    }

    #[test]
    fn test_validation_rejects_bad_camera() {
        let mut config = ViewerConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.camera.min_fov_degrees = 120.0;
        assert!(config.validate().is_err());
    }
}
