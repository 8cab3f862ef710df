//! Standard lit material
//!
//! Shades a surface with every light of the frame, one additive pass per light.
//! A debug mode swaps the lit program for one that visualizes surface normals.

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle, Topology};
use crate::render::camera::Camera;
use crate::render::lighting::FrameState;
use crate::render::material::inspect::Inspector;
use crate::render::material::passes::render_light_passes;
use crate::render::material::{upload_view_uniforms, with_program};
use crate::render::program::ProgramLibrary;
use crate::render::uniforms::UniformBinder;

/// Multi-light surface material
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    /// Surface color
    pub color: Vec4,
    /// Optional surface texture
    pub texture: Option<TextureHandle>,
    base_program: Option<ProgramHandle>,
    normal_program: Option<ProgramHandle>,
    show_normals: bool,
}

impl StandardMaterial {
    /// Vertex stage source file
    pub const VERTEX_SHADER: &'static str = "basic.vs";
    /// Lit fragment stage
    pub const BASE_SHADER: &'static str = "basic.fs";
    /// Normal visualization fragment stage
    pub const NORMAL_SHADER: &'static str = "normal.fs";

    /// Create a standard material, loading both of its programs
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self {
            color,
            texture: None,
            base_program: programs.get(gpu, Self::VERTEX_SHADER, Self::BASE_SHADER),
            normal_program: programs.get(gpu, Self::VERTEX_SHADER, Self::NORMAL_SHADER),
            show_normals: false,
        }
    }

    /// Attach a surface texture
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Whether the normal visualization is active
    pub fn show_normals(&self) -> bool {
        self.show_normals
    }

    /// Toggle the normal visualization
    pub fn set_show_normals(&mut self, show: bool) {
        self.show_normals = show;
    }

    /// Program the next render will use
    pub fn active_program(&self) -> Option<ProgramHandle> {
        if self.show_normals {
            self.normal_program
        } else {
            self.base_program
        }
    }

    /// Upload transform and viewer inputs, plus color and texture when lit
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        upload_view_uniforms(binder, camera, model);
        if !self.show_normals {
            binder.set("u_color", self.color);
            binder.set_optional("u_texture", self.texture);
        }
    }

    /// Draw `mesh` once per light of `frame`
    ///
    /// The normal visualization ignores lighting and draws a single opaque pass.
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
        frame: &FrameState,
    ) {
        with_program(gpu, self.active_program(), "standard", |gpu, program| {
            if self.show_normals {
                self.set_uniforms(&mut UniformBinder::new(&mut *gpu, program), camera, model);
                gpu.draw_mesh(mesh, Topology::Triangles);
            } else {
                render_light_passes(gpu, program, mesh, frame, |binder| {
                    self.set_uniforms(binder, camera, model);
                });
            }
        });
    }

    /// Expose the normal toggle and color to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        ui.checkbox("Show Normals", &mut self.show_normals);
        if !self.show_normals {
            ui.color_edit("Color", &mut self.color);
        }
    }
}
