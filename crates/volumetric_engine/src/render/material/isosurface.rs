//! Isosurface material
//!
//! Ray-marches a scalar field and stops at the level set `field == threshold`.
//! Shading is either unlit or a Phong model using the frame's first light, with
//! the gradient estimated by central differences of width `h`.

use crate::foundation::math::{utils, Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle, Topology};
use crate::render::camera::Camera;
use crate::render::lighting::{FrameState, Light};
use crate::render::material::inspect::{DragRange, Inspector};
use crate::render::material::{upload_view_uniforms, with_program};
use crate::render::program::ProgramLibrary;
use crate::render::uniforms::UniformBinder;

/// Shading applied at the surface hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsoShading {
    /// Base color only
    Unlit,
    /// Phong shading with the first light of the frame
    #[default]
    Lit,
}

impl IsoShading {
    /// Menu labels, unlit first
    pub const LABELS: [&'static str; 2] = ["No Light", "Light"];

    fn index(self) -> usize {
        match self {
            Self::Unlit => 0,
            Self::Lit => 1,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Unlit),
            1 => Some(Self::Lit),
            _ => None,
        }
    }
}

/// Level-set ray-marching material
#[derive(Debug, Clone)]
pub struct IsosurfaceMaterial {
    /// Surface color
    pub color: Vec4,
    /// Optional scalar field texture
    pub texture: Option<TextureHandle>,
    shading: IsoShading,
    unlit_program: Option<ProgramHandle>,
    lit_program: Option<ProgramHandle>,
    step_length: f32,
    threshold: f32,
    jittering: bool,
    h: f32,
    ambient: Vec4,
    specular: Vec4,
    alpha: f32,
}

impl IsosurfaceMaterial {
    /// Vertex stage source file
    pub const VERTEX_SHADER: &'static str = "basic.vs";
    /// Unlit fragment stage
    pub const UNLIT_SHADER: &'static str = "isosurface.fs";
    /// Lit fragment stage
    pub const LIT_SHADER: &'static str = "isosurface_light.fs";

    /// Ray-march step slider
    pub const STEP_LENGTH_RANGE: DragRange = DragRange::new(0.0005, 0.0001);
    /// Level-set threshold slider
    pub const THRESHOLD_RANGE: DragRange = DragRange::new(0.01, 0.0);
    /// Gradient difference width slider
    pub const H_RANGE: DragRange = DragRange::new(0.00001, 0.00001);
    /// Specular exponent slider
    pub const ALPHA_RANGE: DragRange = DragRange::new(0.1, 1.0);

    /// Create an isosurface material, loading both shading programs
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self::with_programs(
            programs.get(gpu, Self::VERTEX_SHADER, Self::UNLIT_SHADER),
            programs.get(gpu, Self::VERTEX_SHADER, Self::LIT_SHADER),
            color,
        )
    }

    /// Create an isosurface material around already loaded programs
    pub fn with_programs(
        unlit_program: Option<ProgramHandle>,
        lit_program: Option<ProgramHandle>,
        color: Vec4,
    ) -> Self {
        Self {
            color,
            texture: None,
            shading: IsoShading::default(),
            unlit_program,
            lit_program,
            step_length: 0.05,
            threshold: 1.0,
            jittering: false,
            h: 0.0001,
            ambient: Vec4::new(0.1, 0.1, 0.1, 1.0),
            specular: Vec4::new(0.5, 0.5, 0.5, 1.0),
            alpha: 1.0,
        }
    }

    /// Selected shading
    pub fn shading(&self) -> IsoShading {
        self.shading
    }

    /// Select the shading; parameters are kept
    pub fn set_shading(&mut self, shading: IsoShading) {
        self.shading = shading;
    }

    /// Whether the lit program will run
    ///
    /// Lit shading with black ambient and specular terms degenerates to the
    /// unlit result, so the cheaper program is used instead.
    pub fn is_lit(&self) -> bool {
        self.shading == IsoShading::Lit
            && (utils::has_visible_rgb(&self.ambient) || utils::has_visible_rgb(&self.specular))
    }

    /// Program the next render will use
    pub fn active_program(&self) -> Option<ProgramHandle> {
        if self.is_lit() {
            self.lit_program
        } else {
            self.unlit_program
        }
    }

    /// Ray-march step length
    pub fn step_length(&self) -> f32 {
        self.step_length
    }

    /// Set the step length, clamped to its range
    pub fn set_step_length(&mut self, value: f32) {
        self.step_length = Self::STEP_LENGTH_RANGE.clamp(value);
    }

    /// Level-set value
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Set the level-set value, clamped to its range
    pub fn set_threshold(&mut self, value: f32) {
        self.threshold = Self::THRESHOLD_RANGE.clamp(value);
    }

    /// Whether ray start offsets are jittered
    pub fn jittering(&self) -> bool {
        self.jittering
    }

    /// Toggle ray start jittering
    pub fn set_jittering(&mut self, jittering: bool) {
        self.jittering = jittering;
    }

    /// Gradient difference width
    pub fn h(&self) -> f32 {
        self.h
    }

    /// Set the gradient difference width, clamped to its range
    pub fn set_h(&mut self, value: f32) {
        self.h = Self::H_RANGE.clamp(value);
    }

    /// Phong ambient reflectance
    pub fn ambient(&self) -> Vec4 {
        self.ambient
    }

    /// Set the Phong ambient reflectance
    pub fn set_ambient(&mut self, ambient: Vec4) {
        self.ambient = ambient;
    }

    /// Phong specular reflectance
    pub fn specular(&self) -> Vec4 {
        self.specular
    }

    /// Set the Phong specular reflectance
    pub fn set_specular(&mut self, specular: Vec4) {
        self.specular = specular;
    }

    /// Phong specular exponent
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Set the specular exponent, clamped to its range
    pub fn set_alpha(&mut self, value: f32) {
        self.alpha = Self::ALPHA_RANGE.clamp(value);
    }

    /// Upload transform, viewer, color, texture and marching inputs
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        upload_view_uniforms(binder, camera, model);
        binder.set_optional("u_texture", self.texture);
        binder.set("u_color", self.color);
        binder.set("u_step_length", self.step_length);
        binder.set("u_threshold", self.threshold);
        binder.set("u_jittering", self.jittering);
        binder.set("u_h", self.h);

        if self.is_lit() {
            binder.set("u_ambient", self.ambient);
            binder.set("u_ks", self.specular);
            binder.set("u_alpha", self.alpha);
        }
    }

    /// Ray-march `mesh` in a single pass
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
        frame: &FrameState,
    ) {
        with_program(gpu, self.active_program(), "isosurface", |gpu, program| {
            {
                let mut binder = UniformBinder::new(&mut *gpu, program);
                self.set_uniforms(&mut binder, camera, model);
                if self.is_lit() {
                    binder.set("u_ambient_light", frame.ambient);
                    binder.set("u_background_light", frame.background);
                    match frame.lights.first() {
                        Some(light) => light.upload(&mut binder),
                        None => Light::upload_unlit(&mut binder),
                    }
                }
            }
            gpu.draw_mesh(mesh, Topology::Triangles);
        });
    }

    /// Expose shading and marching parameters to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        let mut current = self.shading.index();
        if ui.combo("Shading", &mut current, &IsoShading::LABELS) {
            if let Some(shading) = IsoShading::from_index(current) {
                self.shading = shading;
            }
        }

        ui.color_edit("Color", &mut self.color);
        ui.drag_float("Step Length", &mut self.step_length, Self::STEP_LENGTH_RANGE);
        ui.drag_float("Threshold", &mut self.threshold, Self::THRESHOLD_RANGE);
        ui.checkbox("Jittering", &mut self.jittering);
        ui.drag_float("h", &mut self.h, Self::H_RANGE);

        if self.shading == IsoShading::Lit {
            ui.color_edit("Ambient", &mut self.ambient);
            ui.color_edit("Specular", &mut self.specular);
            ui.drag_float("Alpha", &mut self.alpha, Self::ALPHA_RANGE);
        }

        self.set_step_length(self.step_length);
        self.set_threshold(self.threshold);
        self.set_h(self.h);
        self.set_alpha(self.alpha);
    }
}
