//! Rendering system
//!
//! Host-side orchestration of the viewer's GPU work: a backend contract, a
//! program library, uniform binding, the camera and frame lighting state, and
//! the material family that decides which program runs for an object and with
//! which inputs.
//!
//! # Frame protocol
//!
//! For every visible node the scene calls [`Material::render`] with the node's
//! mesh and model transform, the [`Camera`] and the [`FrameState`]. The material
//! binds its selected program, uploads uniforms, issues one draw call per pass
//! and unbinds the program, leaving [`RasterState::default`] behind.

pub mod backend;
pub mod camera;
pub mod headless;
pub mod lighting;
pub mod material;
pub mod program;
pub mod uniforms;

pub use backend::{
    BlendMode, DepthFunc, MeshHandle, PolygonMode, ProgramHandle, ProgramSource, RasterState,
    RenderBackend, TextureHandle, Topology, UniformValue,
};
pub use camera::Camera;
pub use headless::{DrawRecord, GpuCommand, HeadlessBackend};
pub use lighting::{FrameState, Light, LightType};
pub use material::{
    DensitySource, DragRange, FlatMaterial, Inspector, IsoShading, IsosurfaceMaterial,
    LogInspector, Material, MaterialCapabilities, StandardMaterial, TexturedVolumeMaterial,
    VolumeMaterial, VolumeMode, WireframeMaterial,
};
pub use program::ProgramLibrary;
pub use uniforms::UniformBinder;

use thiserror::Error;

/// Error types for rendering operations
///
/// Only program compilation surfaces as a returned error. The other variants
/// describe faults that the frame protocol logs and recovers from.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A program failed to load or compile
    ///
    /// The caller keeps a null handle and the owning material skips its draws.
    #[error("Failed to compile program {program}: {reason}")]
    ProgramCompilation {
        /// Program sources that failed
        program: String,
        /// Backend diagnostic
        reason: String,
    },

    /// A material was asked to render while its selected program is not loaded
    #[error("Material '{material}' has no loaded program for its current mode")]
    MissingProgram {
        /// Material description
        material: String,
    },

    /// A uniform was uploaded that the active program does not declare
    #[error("Program {program} does not declare uniform '{name}'")]
    UniformMismatch {
        /// Program receiving the upload
        program: ProgramHandle,
        /// Uniform name that was dropped
        name: String,
    },

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
