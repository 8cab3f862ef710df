//! # Volumetric Engine
//!
//! Host-side rendering core of a volumetric viewer: materials that select GPU
//! programs, bind their inputs and drive single- or multi-pass draws for flat,
//! lit, ray-marched volume and isosurface techniques.
//!
//! ## Features
//!
//! - **Material family**: Flat, Wireframe, Standard, Volume, TexturedVolume and Isosurface
//! - **Multi-light accumulation**: one additive pass per light
//! - **Backend contract**: any GPU API behind [`render::RenderBackend`]
//! - **Headless backend**: records every command, used by the viewer and tests
//! - **Hot reloading**: programs recompile in place between frames
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volumetric_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let mut gpu = HeadlessBackend::without_history();
//!     let mut programs = ProgramLibrary::new(config.shaders.directory.clone());
//!
//!     let mut scene = Scene::showcase(&config, &mut programs, &mut gpu, MeshHandle(0));
//!     scene.update(config.engine.frame_time);
//!     let stats = scene.render(&mut gpu);
//!     println!("{} draw calls", stats.draw_calls);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::{SceneTechnique, ViewerConfig},
        foundation::math::{Mat4, Vec3, Vec4},
        render::{
            Camera, DensitySource, FlatMaterial, FrameState, HeadlessBackend, Inspector,
            IsoShading, IsosurfaceMaterial, Light, LogInspector, Material, MeshHandle,
            ProgramLibrary, RenderBackend, StandardMaterial, TexturedVolumeMaterial,
            VolumeMaterial, VolumeMode, WireframeMaterial,
        },
        scene::{FrameStats, Scene, SceneNode},
    };
}
