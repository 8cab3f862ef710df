//! Scattering volume with a selectable density source
//!
//! Ray-marches a medium that both absorbs and scatters light from the frame's
//! first light. Density comes from a constant, procedural noise, or a 3D texture
//! supplied by the caller, such as a voxel grid converted from a volume file.

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle, Topology};
use crate::render::camera::Camera;
use crate::render::lighting::{FrameState, Light};
use crate::render::material::inspect::{DragRange, Inspector};
use crate::render::material::volume::VolumeMaterial;
use crate::render::material::{upload_view_uniforms, with_program};
use crate::render::program::ProgramLibrary;
use crate::render::uniforms::UniformBinder;

/// Where the medium density is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DensitySource {
    /// Uniform density of one
    Constant,
    /// Fractal noise controlled by noise scale and detail
    Noise,
    /// Red channel of the material texture
    #[default]
    Texture,
}

impl DensitySource {
    /// All sources, in menu order
    pub const ALL: [Self; 3] = [Self::Constant, Self::Noise, Self::Texture];

    /// Menu labels, indexed like [`DensitySource::ALL`]
    pub const LABELS: [&'static str; 3] = ["Constant", "Noise", "Texture"];

    /// Value of `u_density_type`
    pub fn code(self) -> i32 {
        match self {
            Self::Constant => 0,
            Self::Noise => 1,
            Self::Texture => 2,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Constant => 0,
            Self::Noise => 1,
            Self::Texture => 2,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Absorbing and scattering medium with a selectable density source
#[derive(Debug, Clone)]
pub struct TexturedVolumeMaterial {
    /// Medium color
    pub color: Vec4,
    /// 3D density texture
    pub texture: Option<TextureHandle>,
    density: DensitySource,
    program: Option<ProgramHandle>,
    absorption_coef: f32,
    scattering_coef: f32,
    step_length: f32,
    noise_scale: f32,
    noise_detail: f32,
}

impl TexturedVolumeMaterial {
    /// Vertex stage source file
    pub const VERTEX_SHADER: &'static str = "basic.vs";
    /// Fragment stage source file
    pub const FRAGMENT_SHADER: &'static str = "density_volume.fs";

    /// Scattering coefficient slider
    pub const SCATTERING_RANGE: DragRange = DragRange::new(0.025, 0.0);

    /// Create the material, loading its program
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self::with_program(
            programs.get(gpu, Self::VERTEX_SHADER, Self::FRAGMENT_SHADER),
            color,
        )
    }

    /// Create the material around an already loaded program
    pub fn with_program(program: Option<ProgramHandle>, color: Vec4) -> Self {
        Self {
            color,
            texture: None,
            density: DensitySource::default(),
            program,
            absorption_coef: 2.0,
            scattering_coef: 0.2,
            step_length: 0.1,
            noise_scale: 2.5,
            noise_detail: 5.0,
        }
    }

    /// Attach the density texture
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Program drawing the medium
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// Selected density source
    pub fn density(&self) -> DensitySource {
        self.density
    }

    /// Select the density source
    pub fn set_density(&mut self, density: DensitySource) {
        self.density = density;
    }

    /// Density source the next render uploads
    ///
    /// A texture source without a texture falls back to noise.
    pub fn effective_density(&self) -> DensitySource {
        match (self.density, self.texture) {
            (DensitySource::Texture, None) => DensitySource::Noise,
            (density, _) => density,
        }
    }

    /// Absorption coefficient
    pub fn absorption_coef(&self) -> f32 {
        self.absorption_coef
    }

    /// Set the absorption coefficient, clamped to its range
    pub fn set_absorption_coef(&mut self, value: f32) {
        self.absorption_coef = VolumeMaterial::ABSORPTION_RANGE.clamp(value);
    }

    /// Scattering coefficient
    pub fn scattering_coef(&self) -> f32 {
        self.scattering_coef
    }

    /// Set the scattering coefficient, clamped to its range
    pub fn set_scattering_coef(&mut self, value: f32) {
        self.scattering_coef = Self::SCATTERING_RANGE.clamp(value);
    }

    /// Ray-march step length
    pub fn step_length(&self) -> f32 {
        self.step_length
    }

    /// Set the step length, clamped to its range
    pub fn set_step_length(&mut self, value: f32) {
        self.step_length = VolumeMaterial::STEP_LENGTH_RANGE.clamp(value);
    }

    /// Noise frequency
    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    /// Set the noise frequency, clamped to its range
    pub fn set_noise_scale(&mut self, value: f32) {
        self.noise_scale = VolumeMaterial::NOISE_SCALE_RANGE.clamp(value);
    }

    /// Noise octave count
    pub fn noise_detail(&self) -> f32 {
        self.noise_detail
    }

    /// Set the noise octave count, clamped to its range
    pub fn set_noise_detail(&mut self, value: f32) {
        self.noise_detail = VolumeMaterial::NOISE_DETAIL_RANGE.clamp(value);
    }

    /// Upload transform, viewer, color, density and medium inputs
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        upload_view_uniforms(binder, camera, model);
        binder.set("u_color", self.color);
        binder.set_optional("u_texture", self.texture);
        binder.set("u_density_type", self.effective_density().code());
        binder.set("u_abs_coef", self.absorption_coef);
        binder.set("u_scattering_coef", self.scattering_coef);
        binder.set("u_step_length", self.step_length);
        binder.set("u_noise_scale", self.noise_scale);
        binder.set("u_noise_detail", self.noise_detail);
    }

    /// Ray-march `mesh` in a single pass, scattering the first light
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
        frame: &FrameState,
    ) {
        with_program(gpu, self.program, "textured volume", |gpu, program| {
            {
                let mut binder = UniformBinder::new(&mut *gpu, program);
                self.set_uniforms(&mut binder, camera, model);
                binder.set("u_ambient_light", frame.ambient);
                binder.set("u_background_light", frame.background);
                match frame.lights.first() {
                    Some(light) => light.upload(&mut binder),
                    None => Light::upload_unlit(&mut binder),
                }
            }
            gpu.draw_mesh(mesh, Topology::Triangles);
        });
    }

    /// Expose the density source and medium parameters to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        let mut current = self.density.index();
        if ui.combo("Density Type", &mut current, &DensitySource::LABELS) {
            if let Some(density) = DensitySource::from_index(current) {
                self.density = density;
            }
        }

        ui.color_edit("Color", &mut self.color);
        ui.drag_float(
            "Absorption Coefficient",
            &mut self.absorption_coef,
            VolumeMaterial::ABSORPTION_RANGE,
        );
        ui.drag_float(
            "Scattering Coefficient",
            &mut self.scattering_coef,
            Self::SCATTERING_RANGE,
        );
        ui.drag_float(
            "Step Length",
            &mut self.step_length,
            VolumeMaterial::STEP_LENGTH_RANGE,
        );
        if self.density == DensitySource::Noise {
            ui.drag_float(
                "Noise Scale",
                &mut self.noise_scale,
                VolumeMaterial::NOISE_SCALE_RANGE,
            );
            ui.drag_float(
                "Noise Detail",
                &mut self.noise_detail,
                VolumeMaterial::NOISE_DETAIL_RANGE,
            );
        }

        self.set_absorption_coef(self.absorption_coef);
        self.set_scattering_coef(self.scattering_coef);
        self.set_step_length(self.step_length);
        self.set_noise_scale(self.noise_scale);
        self.set_noise_detail(self.noise_detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::material::fixtures;
    use crate::render::material::inspect::{FieldValue, RecordingInspector};
    use crate::render::{RasterState, UniformValue};

    fn material(gpu: &mut dyn RenderBackend) -> TexturedVolumeMaterial {
        TexturedVolumeMaterial::new(&mut fixtures::library(), gpu, Vec4::new(1.0, 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_defaults() {
        let mut gpu = fixtures::backend();
        let material = material(&mut gpu);

        assert!(material.program().is_some());
        assert_eq!(material.density(), DensitySource::Texture);
        assert_eq!(material.absorption_coef(), 2.0);
        assert_eq!(material.scattering_coef(), 0.2);
        assert_eq!(material.step_length(), 0.1);
        assert_eq!(material.noise_scale(), 2.5);
        assert_eq!(material.noise_detail(), 5.0);
    }

    #[test]
    fn test_texture_density_uploads_texture_and_code() {
        let mut gpu = fixtures::backend();
        let material = material(&mut gpu).with_texture(TextureHandle(9));
        let light = Vec3::new(1.5, 1.5, 1.5);
        let frame = FrameState::default().add_light(Light::point(light, 3.0));

        material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &Camera::default(), &frame);

        assert_eq!(gpu.draws().len(), 1);
        let draw = &gpu.draws()[0];
        assert_eq!(draw.state, RasterState::default());
        assert_eq!(draw.uniform("u_texture"), Some(&UniformValue::Texture(TextureHandle(9))));
        assert_eq!(draw.uniform("u_density_type"), Some(&UniformValue::Int(2)));
        assert_eq!(draw.uniform("u_scattering_coef"), Some(&UniformValue::Float(0.2)));
        assert_eq!(draw.uniform("u_light_position"), Some(&UniformValue::Vec3(light)));
        assert_eq!(gpu.rejected_uniform_count(), 0);
    }

    #[test]
    fn test_texture_density_without_texture_falls_back_to_noise() {
        let mut gpu = fixtures::backend();
        let material = material(&mut gpu);

        assert_eq!(material.effective_density(), DensitySource::Noise);
        material.render(
            &mut gpu,
            MeshHandle(0),
            &Mat4::identity(),
            &Camera::default(),
            &FrameState::default(),
        );

        let draw = &gpu.draws()[0];
        assert_eq!(draw.uniform("u_density_type"), Some(&UniformValue::Int(1)));
        assert_eq!(draw.uniform("u_texture"), None);
        assert_eq!(draw.uniform("u_light_intensity"), Some(&UniformValue::Float(0.0)));
    }

    #[test]
    fn test_setters_clamp() {
        let mut gpu = fixtures::backend();
        let mut material = material(&mut gpu);

        material.set_scattering_coef(-0.5);
        material.set_absorption_coef(f32::NAN);
        material.set_step_length(0.0);
        material.set_noise_detail(0.0);

        assert_eq!(material.scattering_coef(), 0.0);
        assert_eq!(material.absorption_coef(), 0.0);
        assert_eq!(material.step_length(), 0.0001);
        assert_eq!(material.noise_detail(), 0.5);
    }

    #[test]
    fn test_density_edit_reaches_next_upload() {
        let mut gpu = fixtures::backend();
        let mut material = material(&mut gpu).with_texture(TextureHandle(1));

        let mut ui = RecordingInspector::default()
            .with_edit("Density Type", FieldValue::Choice(0))
            .with_edit("Scattering Coefficient", FieldValue::Float(-1.0));
        material.inspect(&mut ui);

        assert_eq!(material.density(), DensitySource::Constant);
        assert_eq!(material.scattering_coef(), 0.0);
        assert!(!ui.labels().contains(&"Noise Scale"));

        material.render(
            &mut gpu,
            MeshHandle(0),
            &Mat4::identity(),
            &Camera::default(),
            &FrameState::default(),
        );
        let draw = &gpu.draws()[0];
        assert_eq!(draw.uniform("u_density_type"), Some(&UniformValue::Int(0)));
        assert_eq!(draw.uniform("u_scattering_coef"), Some(&UniformValue::Float(0.0)));
    }

    #[test]
    fn test_noise_fields_shown_only_for_noise_density() {
        let mut gpu = fixtures::backend();
        let mut material = material(&mut gpu);
        material.set_density(DensitySource::Noise);

        let mut ui = RecordingInspector::default().with_edit("Noise Scale", FieldValue::Float(0.1));
        material.inspect(&mut ui);

        assert!(ui.labels().contains(&"Noise Detail"));
        assert_eq!(material.noise_scale(), 0.5);
    }
}
