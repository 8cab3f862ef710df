//! Ray-marched volume material
//!
//! One material, five rendering techniques. Every technique's program is loaded
//! up front and the active one is picked by [`VolumeMode`] at render time, so a
//! mode switch never touches the tunable parameters.

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle, Topology};
use crate::render::camera::Camera;
use crate::render::lighting::{FrameState, Light};
use crate::render::material::inspect::{DragRange, Inspector};
use crate::render::material::{upload_view_uniforms, with_program};
use crate::render::program::ProgramLibrary;
use crate::render::uniforms::UniformBinder;

/// Volume rendering technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VolumeMode {
    /// Plain surface shading of the bounding mesh
    Base,
    /// Surface normal visualization
    Normal,
    /// Constant-density absorption
    HomogeneousAbsorption,
    /// Noise-driven density absorption
    HeterogeneousAbsorption,
    /// Emission and absorption along the ray
    #[default]
    EmissionAbsorption,
}

impl VolumeMode {
    /// All modes, in menu order
    pub const ALL: [Self; 5] = [
        Self::Base,
        Self::Normal,
        Self::HomogeneousAbsorption,
        Self::HeterogeneousAbsorption,
        Self::EmissionAbsorption,
    ];

    /// Menu labels, indexed like [`VolumeMode::ALL`]
    pub const LABELS: [&'static str; 5] = [
        "Base",
        "Normal",
        "Homogeneous",
        "Heterogeneous",
        "Emission-Absorption",
    ];

    /// Position in menu order
    pub fn index(self) -> usize {
        match self {
            Self::Base => 0,
            Self::Normal => 1,
            Self::HomogeneousAbsorption => 2,
            Self::HeterogeneousAbsorption => 3,
            Self::EmissionAbsorption => 4,
        }
    }

    /// Mode at a menu position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    /// Fragment stage implementing the mode
    pub fn fragment_shader(self) -> &'static str {
        match self {
            Self::Base => "basic.fs",
            Self::Normal => "normal.fs",
            Self::HomogeneousAbsorption => "homogeneous.fs",
            Self::HeterogeneousAbsorption => "heterogeneous.fs",
            Self::EmissionAbsorption => "emissive_absorption.fs",
        }
    }
}

/// One program slot per [`VolumeMode`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumePrograms {
    /// [`VolumeMode::Base`]
    pub base: Option<ProgramHandle>,
    /// [`VolumeMode::Normal`]
    pub normal: Option<ProgramHandle>,
    /// [`VolumeMode::HomogeneousAbsorption`]
    pub homogeneous: Option<ProgramHandle>,
    /// [`VolumeMode::HeterogeneousAbsorption`]
    pub heterogeneous: Option<ProgramHandle>,
    /// [`VolumeMode::EmissionAbsorption`]
    pub emission_absorption: Option<ProgramHandle>,
}

impl VolumePrograms {
    /// Load the program of every mode
    pub fn load(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend) -> Self {
        let mut load = |mode: VolumeMode| {
            programs.get(&mut *gpu, VolumeMaterial::VERTEX_SHADER, mode.fragment_shader())
        };
        Self {
            base: load(VolumeMode::Base),
            normal: load(VolumeMode::Normal),
            homogeneous: load(VolumeMode::HomogeneousAbsorption),
            heterogeneous: load(VolumeMode::HeterogeneousAbsorption),
            emission_absorption: load(VolumeMode::EmissionAbsorption),
        }
    }

    /// Program of a mode
    pub fn get(&self, mode: VolumeMode) -> Option<ProgramHandle> {
        match mode {
            VolumeMode::Base => self.base,
            VolumeMode::Normal => self.normal,
            VolumeMode::HomogeneousAbsorption => self.homogeneous,
            VolumeMode::HeterogeneousAbsorption => self.heterogeneous,
            VolumeMode::EmissionAbsorption => self.emission_absorption,
        }
    }
}

/// Participating-medium material
#[derive(Debug, Clone)]
pub struct VolumeMaterial {
    /// Medium color
    pub color: Vec4,
    /// Optional density texture
    pub texture: Option<TextureHandle>,
    mode: VolumeMode,
    programs: VolumePrograms,
    absorption_coef: f32,
    step_length: f32,
    noise_scale: f32,
    noise_detail: f32,
}

impl VolumeMaterial {
    /// Vertex stage shared by every mode
    pub const VERTEX_SHADER: &'static str = "basic.vs";

    /// Absorption coefficient slider
    pub const ABSORPTION_RANGE: DragRange = DragRange::new(0.025, 0.0);
    /// Ray-march step slider
    pub const STEP_LENGTH_RANGE: DragRange = DragRange::new(0.0005, 0.0001);
    /// Noise scale slider
    pub const NOISE_SCALE_RANGE: DragRange = DragRange::new(0.1, 0.5);
    /// Noise detail slider
    pub const NOISE_DETAIL_RANGE: DragRange = DragRange::new(0.1, 0.5);

    /// Create a volume material, loading the program of every mode
    pub fn new(programs: &mut ProgramLibrary, gpu: &mut dyn RenderBackend, color: Vec4) -> Self {
        Self::with_programs(VolumePrograms::load(programs, gpu), color)
    }

    /// Create a volume material around already loaded programs
    pub fn with_programs(programs: VolumePrograms, color: Vec4) -> Self {
        Self {
            color,
            texture: None,
            mode: VolumeMode::default(),
            programs,
            absorption_coef: 2.0,
            step_length: 0.05,
            noise_scale: 2.5,
            noise_detail: 5.0,
        }
    }

    /// Selected technique
    pub fn mode(&self) -> VolumeMode {
        self.mode
    }

    /// Select a technique; parameters are kept
    pub fn set_mode(&mut self, mode: VolumeMode) {
        if mode != self.mode {
            log::debug!("Volume mode {} -> {}", self.mode.label(), mode.label());
        }
        self.mode = mode;
    }

    /// Program of the selected technique
    pub fn active_program(&self) -> Option<ProgramHandle> {
        self.programs.get(self.mode)
    }

    /// Absorption coefficient
    pub fn absorption_coef(&self) -> f32 {
        self.absorption_coef
    }

    /// Set the absorption coefficient, clamped to its range
    pub fn set_absorption_coef(&mut self, value: f32) {
        self.absorption_coef = Self::ABSORPTION_RANGE.clamp(value);
    }

    /// Ray-march step length
    pub fn step_length(&self) -> f32 {
        self.step_length
    }

    /// Set the step length, clamped to its range
    pub fn set_step_length(&mut self, value: f32) {
        self.step_length = Self::STEP_LENGTH_RANGE.clamp(value);
    }

    /// Noise frequency
    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    /// Set the noise frequency, clamped to its range
    pub fn set_noise_scale(&mut self, value: f32) {
        self.noise_scale = Self::NOISE_SCALE_RANGE.clamp(value);
    }

    /// Noise octave count
    pub fn noise_detail(&self) -> f32 {
        self.noise_detail
    }

    /// Set the noise octave count, clamped to its range
    pub fn set_noise_detail(&mut self, value: f32) {
        self.noise_detail = Self::NOISE_DETAIL_RANGE.clamp(value);
    }

    /// Upload transform, viewer, color, texture and medium inputs
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        upload_view_uniforms(binder, camera, model);
        binder.set_optional("u_texture", self.texture);
        binder.set("u_color", self.color);
        binder.set("u_abs_coef", self.absorption_coef);
        binder.set("u_step_length", self.step_length);
        binder.set("u_noise_scale", self.noise_scale);
        binder.set("u_noise_detail", self.noise_detail);
    }

    /// Ray-march `mesh` in a single pass with the selected technique
    ///
    /// The base technique shades the bounding mesh with the frame's first light.
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
        frame: &FrameState,
    ) {
        let label = format!("volume ({})", self.mode.label());
        with_program(gpu, self.active_program(), &label, |gpu, program| {
            {
                let mut binder = UniformBinder::new(&mut *gpu, program);
                self.set_uniforms(&mut binder, camera, model);
                binder.set("u_ambient_light", frame.ambient);
                binder.set("u_background_light", frame.background);
                if self.mode == VolumeMode::Base {
                    match frame.lights.first() {
                        Some(light) => light.upload(&mut binder),
                        None => Light::upload_unlit(&mut binder),
                    }
                }
            }
            gpu.draw_mesh(mesh, Topology::Triangles);
        });
    }

    /// Expose the mode selector and medium parameters to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        let mut current = self.mode.index();
        if ui.combo("Shader Type", &mut current, &VolumeMode::LABELS) {
            if let Some(mode) = VolumeMode::from_index(current) {
                self.set_mode(mode);
            }
        }

        ui.color_edit("Color", &mut self.color);

        ui.drag_float(
            "Absorption Coefficient",
            &mut self.absorption_coef,
            Self::ABSORPTION_RANGE,
        );
        ui.drag_float("Step Length", &mut self.step_length, Self::STEP_LENGTH_RANGE);
        ui.drag_float("Noise Scale", &mut self.noise_scale, Self::NOISE_SCALE_RANGE);
        ui.drag_float("Noise Detail", &mut self.noise_detail, Self::NOISE_DETAIL_RANGE);

        self.set_absorption_coef(self.absorption_coef);
        self.set_step_length(self.step_length);
        self.set_noise_scale(self.noise_scale);
        self.set_noise_detail(self.noise_detail);
    }
}
