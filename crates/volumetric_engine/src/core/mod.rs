//! # Core Engine Module
//!
//! Shared configuration used by every subsystem of the viewer.
//!
//! ## Organization
//!
//! - **Config**: Viewer configuration (engine, shaders, camera, lighting, scene)
//! - **Foundation**: Low-level utilities (math, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    CameraConfig,
    Config,
    ConfigError,
    EngineConfig,
    LightingConfig,
    SceneConfig,
    SceneTechnique,
    ShaderConfig,
    ViewerConfig,
};
