//! Backend abstraction traits for the rendering system
//!
//! This module defines the contract a graphics backend must implement so that
//! materials can select GPU programs, push uniforms and issue draw calls without
//! knowing which API sits underneath.
//!
//! Backend calls other than program compilation are fire-and-forget: once a
//! program compiled, binding it, uploading a uniform or drawing is assumed to
//! succeed.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::RenderResult;
use std::fmt;

/// Handle to a compiled GPU program owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// Source files of a vertex/fragment program pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramSource {
    /// Path of the vertex stage source
    pub vertex_path: String,
    /// Path of the fragment stage source
    pub fragment_path: String,
}

impl ProgramSource {
    /// Create a new program source description
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }
}

impl fmt::Display for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.vertex_path, self.fragment_path)
    }
}

/// A value pushed into a named program input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar float
    Float(f32),
    /// Scalar integer; booleans upload as 0 / 1
    Int(i32),
    /// Three component vector
    Vec3(Vec3),
    /// Four component vector or RGBA color
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Texture reference, bound to a unit chosen by the backend
    Texture(TextureHandle),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Int(i32::from(value))
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

impl From<TextureHandle> for UniformValue {
    fn from(value: TextureHandle) -> Self {
        Self::Texture(value)
    }
}

/// Primitive topology of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Triangle list
    Triangles,
    /// Line list
    Lines,
    /// Point list
    Points,
}

/// Polygon rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Normal solid rendering
    #[default]
    Fill,
    /// Wireframe mode
    Line,
}

/// Color blending applied to fragment output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Blending disabled, fragments overwrite the framebuffer
    #[default]
    Opaque,
    /// `src * 1 + dst * 1`, used to accumulate light passes
    Additive,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFunc {
    /// Pass when closer than the stored depth
    Less,
    /// Pass when closer than or equal to the stored depth
    #[default]
    LessEqual,
}

/// Global rasterizer state shared by every draw call
///
/// `RasterState::default()` is the state every material expects on entry and
/// must leave behind on exit: filled polygons, back-face culling, no blending and
/// a less-or-equal depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    /// Polygon fill mode
    pub polygon_mode: PolygonMode,
    /// Whether back faces are culled
    pub face_culling: bool,
    /// Blend function
    pub blend: BlendMode,
    /// Depth test function
    pub depth: DepthFunc,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            face_culling: true,
            blend: BlendMode::Opaque,
            depth: DepthFunc::LessEqual,
        }
    }
}

impl RasterState {
    /// State for accumulating an extra light pass on top of an existing one
    pub fn additive() -> Self {
        Self {
            blend: BlendMode::Additive,
            depth: DepthFunc::LessEqual,
            ..Self::default()
        }
    }

    /// State for drawing both windings as lines
    pub fn wireframe() -> Self {
        Self {
            polygon_mode: PolygonMode::Line,
            face_culling: false,
            ..Self::default()
        }
    }
}

/// Main rendering backend trait
///
/// This trait abstracts over graphics backends and provides the small surface
/// materials need: program compilation, program activation brackets, named
/// uniform uploads, global raster state and draw submission.
pub trait RenderBackend {
    /// Compile a program from its sources and return a handle to it
    fn compile_program(&mut self, source: &ProgramSource) -> RenderResult<ProgramHandle>;

    /// Recompile an existing program in place, keeping its handle valid
    ///
    /// Must only be called between frames.
    fn reload_program(
        &mut self,
        program: ProgramHandle,
        source: &ProgramSource,
    ) -> RenderResult<()>;

    /// Make a program current for subsequent uniform uploads and draws
    fn bind_program(&mut self, program: ProgramHandle);

    /// Release the current program
    fn unbind_program(&mut self, program: ProgramHandle);

    /// Upload a named uniform into a program
    ///
    /// Returns `false` when the program does not declare an input with that
    /// name. The value is then dropped, which mirrors a missing uniform location.
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: &UniformValue) -> bool;

    /// Remember that `name` was dropped for `program`
    ///
    /// Returns `true` only the first time a pair is noted since the program was
    /// last compiled, so a mismatch is reported once instead of every frame.
    fn note_dropped_uniform(&mut self, program: ProgramHandle, name: &str) -> bool;

    /// Replace the global rasterizer state
    fn set_raster_state(&mut self, state: RasterState);

    /// Issue a draw call for a mesh with the current program and state
    fn draw_mesh(&mut self, mesh: MeshHandle, topology: Topology);

    /// Clear color and depth buffers
    fn clear(&mut self, color: Vec4);

    /// Number of draw calls issued since the backend was created
    fn draw_count(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_raster_state() {
        let state = RasterState::default();
        assert_eq!(state.polygon_mode, PolygonMode::Fill);
        assert!(state.face_culling);
        assert_eq!(state.blend, BlendMode::Opaque);
        assert_eq!(state.depth, DepthFunc::LessEqual);
    }

    #[test]
    fn test_pass_states_only_change_what_they_need() {
        let additive = RasterState::additive();
        assert_eq!(additive.blend, BlendMode::Additive);
        assert!(additive.face_culling);
        assert_eq!(additive.polygon_mode, PolygonMode::Fill);

        let wireframe = RasterState::wireframe();
        assert_eq!(wireframe.polygon_mode, PolygonMode::Line);
        assert!(!wireframe.face_culling);
        assert_eq!(wireframe.blend, BlendMode::Opaque);
    }

    #[test]
    fn test_bool_uniforms_upload_as_int() {
        assert_eq!(UniformValue::from(true), UniformValue::Int(1));
        assert_eq!(UniformValue::from(false), UniformValue::Int(0));
    }
}
