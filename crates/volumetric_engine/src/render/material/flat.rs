//! Flat and wireframe materials

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RasterState, RenderBackend, Topology};
use crate::render::camera::Camera;
use crate::render::material::inspect::Inspector;
use crate::render::material::{upload_view_uniforms, with_program};
use crate::render::program::ProgramLibrary;
use crate::render::uniforms::UniformBinder;

/// Unlit single-color material
#[derive(Debug, Clone)]
pub struct FlatMaterial {
    /// Output color
    pub color: Vec4,
    program: Option<ProgramHandle>,
}

impl FlatMaterial {
    /// Vertex stage source file
    pub const VERTEX_SHADER: &'static str = "basic.vs";
    /// Fragment stage source file
    pub const FRAGMENT_SHADER: &'static str = "flat.fs";

    /// Create a flat material, loading its program through `programs`
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self::with_program(programs.get(gpu, Self::VERTEX_SHADER, Self::FRAGMENT_SHADER), color)
    }

    /// Create a flat material around an already loaded program
    pub fn with_program(program: Option<ProgramHandle>, color: Vec4) -> Self {
        Self { color, program }
    }

    /// Program used to draw
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// Upload transform, viewer and color inputs
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        upload_view_uniforms(binder, camera, model);
        binder.set("u_color", self.color);
    }

    /// Draw `mesh` in a single pass
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
    ) {
        with_program(gpu, self.program, "flat", |gpu, program| {
            self.set_uniforms(&mut UniformBinder::new(&mut *gpu, program), camera, model);
            gpu.draw_mesh(mesh, Topology::Triangles);
        });
    }

    /// Expose the color to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        ui.color_edit("Color", &mut self.color);
    }
}

/// Flat material drawn as polygon outlines
///
/// Switches to line rasterization with culling off for its draw and restores
/// the default raster state afterwards, even when its program is missing.
#[derive(Debug, Clone)]
pub struct WireframeMaterial {
    flat: FlatMaterial,
}

impl WireframeMaterial {
    /// Create a wireframe material of the given line color
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self {
            flat: FlatMaterial::new(programs, gpu, color),
        }
    }

    /// Underlying flat material
    pub fn flat(&self) -> &FlatMaterial {
        &self.flat
    }

    /// Underlying flat material, mutably
    pub fn flat_mut(&mut self) -> &mut FlatMaterial {
        &mut self.flat
    }

    /// Draw the edges of `mesh`
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
    ) {
        gpu.set_raster_state(RasterState::wireframe());
        with_program(gpu, self.flat.program, "wireframe", |gpu, program| {
            self.flat
                .set_uniforms(&mut UniformBinder::new(&mut *gpu, program), camera, model);
            gpu.draw_mesh(mesh, Topology::Triangles);
        });
        gpu.set_raster_state(RasterState::default());
    }

    /// Expose the line color to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        self.flat.inspect(ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::fixtures;
    use crate::render::material::inspect::{FieldValue, RecordingInspector};
    use crate::render::{GpuCommand, HeadlessBackend, PolygonMode, UniformValue};

    #[test]
    fn test_flat_draws_once_with_color() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let material = FlatMaterial::new(&mut programs, &mut gpu, Vec4::new(0.0, 0.0, 1.0, 1.0));

        material.render(&mut gpu, MeshHandle(2), &Mat4::identity(), &Camera::default());

        assert_eq!(gpu.draws().len(), 1);
        let draw = &gpu.draws()[0];
        assert_eq!(draw.program, material.program());
        assert_eq!(draw.mesh, MeshHandle(2));
        let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(draw.uniform("u_color"), Some(&UniformValue::Vec4(blue)));
        assert_eq!(gpu.rejected_uniform_count(), 0);
    }

    #[test]
    fn test_wireframe_draws_lines_and_restores_state() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let material = WireframeMaterial::new(&mut programs, &mut gpu, white);

        material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &Camera::default());

        let draw = &gpu.draws()[0];
        assert_eq!(draw.state.polygon_mode, PolygonMode::Line);
        assert!(!draw.state.face_culling);
        assert_eq!(gpu.raster_state(), RasterState::default());
        assert_eq!(gpu.bound_program(), None);
    }

    #[test]
    fn test_wireframe_restores_state_without_program() {
        let mut gpu = HeadlessBackend::new();
        let material = WireframeMaterial {
            flat: FlatMaterial::with_program(None, Vec4::zeros()),
        };

        material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &Camera::default());

        assert_eq!(gpu.draw_count(), 0);
        assert_eq!(
            gpu.commands().last(),
            Some(&GpuCommand::SetRasterState(RasterState::default()))
        );
    }

    #[test]
    fn test_color_edit_reaches_next_upload() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let mut material = FlatMaterial::new(&mut programs, &mut gpu, white);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);

        let mut ui = RecordingInspector::default().with_edit("Color", FieldValue::Color(red));
        material.inspect(&mut ui);
        material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &Camera::default());

        assert_eq!(gpu.draws()[0].uniform("u_color"), Some(&UniformValue::Vec4(red)));
    }
}
