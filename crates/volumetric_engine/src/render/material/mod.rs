//! Material system for the viewer
//!
//! A material decides which GPU program draws an object and which inputs that
//! program receives. The family is closed, so it is modelled as the
//! [`Material`] enum over one parameter struct per technique.
//!
//! # Material Types
//!
//! - **Flat**: single color, no lighting
//! - **Wireframe**: flat color drawn as lines, used for overlays
//! - **Standard**: lit surface, one additive pass per light
//! - **Volume**: ray-marched volume with five selectable techniques
//! - **TexturedVolume**: scattering volume whose density comes from a constant,
//!   noise or a 3D texture
//! - **Isosurface**: ray-marched level set with optional lighting
//!
//! # Failure policy
//!
//! A material whose selected program did not load logs
//! [`RenderError::MissingProgram`] and skips its draws; the rest of the frame
//! continues. Uniforms the program does not declare are reported by
//! [`UniformBinder`] and otherwise ignored.

pub mod flat;
pub mod inspect;
pub mod isosurface;
mod passes;
pub mod standard;
pub mod textured_volume;
pub mod volume;

pub use flat::{FlatMaterial, WireframeMaterial};
pub use inspect::{DragRange, Inspector, LogInspector};
pub use isosurface::{IsoShading, IsosurfaceMaterial};
pub use standard::StandardMaterial;
pub use textured_volume::{DensitySource, TexturedVolumeMaterial};
pub use volume::{VolumeMaterial, VolumeMode, VolumePrograms};

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle};
use crate::render::camera::Camera;
use crate::render::lighting::FrameState;
use crate::render::uniforms::UniformBinder;
use crate::render::RenderError;

bitflags! {
    /// Optional behaviours a material supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialCapabilities: u32 {
        /// Can be drawn under a wireframe overlay
        const WIREFRAME_OVERLAY = 1 << 0;
        /// Accumulates lighting over one pass per light
        const MULTI_LIGHT = 1 << 1;
        /// Ray-marches a volume inside the mesh bounds
        const RAY_MARCHED = 1 << 2;
        /// Samples an optional texture
        const TEXTURED = 1 << 3;
    }
}

/// Material attached to a scene node
#[derive(Debug, Clone)]
pub enum Material {
    /// Unlit single color
    Flat(FlatMaterial),
    /// Line rendering of a flat material
    Wireframe(WireframeMaterial),
    /// Multi-light surface shading
    Standard(StandardMaterial),
    /// Ray-marched participating medium
    Volume(VolumeMaterial),
    /// Ray-marched scattering medium with a selectable density source
    TexturedVolume(TexturedVolumeMaterial),
    /// Ray-marched level set
    Isosurface(IsosurfaceMaterial),
}

impl Material {
    /// Short human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat(_) => "flat",
            Self::Wireframe(_) => "wireframe",
            Self::Standard(_) => "standard",
            Self::Volume(_) => "volume",
            Self::TexturedVolume(_) => "textured volume",
            Self::Isosurface(_) => "isosurface",
        }
    }

    /// Behaviours this material supports
    pub fn capabilities(&self) -> MaterialCapabilities {
        match self {
            Self::Flat(_) | Self::Wireframe(_) => MaterialCapabilities::WIREFRAME_OVERLAY,
            Self::Standard(_) => {
                MaterialCapabilities::WIREFRAME_OVERLAY
                    | MaterialCapabilities::MULTI_LIGHT
                    | MaterialCapabilities::TEXTURED
            }
            Self::Volume(_) | Self::TexturedVolume(_) | Self::Isosurface(_) => {
                MaterialCapabilities::RAY_MARCHED | MaterialCapabilities::TEXTURED
            }
        }
    }

    /// Whether a wireframe overlay may be drawn over this material
    pub fn supports_wireframe(&self) -> bool {
        self.capabilities().contains(MaterialCapabilities::WIREFRAME_OVERLAY)
    }

    /// Program the next render will use, if it is loaded
    pub fn active_program(&self) -> Option<ProgramHandle> {
        match self {
            Self::Flat(material) => material.program(),
            Self::Wireframe(material) => material.flat().program(),
            Self::Standard(material) => material.active_program(),
            Self::Volume(material) => material.active_program(),
            Self::TexturedVolume(material) => material.program(),
            Self::Isosurface(material) => material.active_program(),
        }
    }

    /// Base color
    pub fn color(&self) -> Vec4 {
        match self {
            Self::Flat(material) => material.color,
            Self::Wireframe(material) => material.flat().color,
            Self::Standard(material) => material.color,
            Self::Volume(material) => material.color,
            Self::TexturedVolume(material) => material.color,
            Self::Isosurface(material) => material.color,
        }
    }

    /// Replace the base color
    pub fn set_color(&mut self, color: Vec4) {
        match self {
            Self::Flat(material) => material.color = color,
            Self::Wireframe(material) => material.flat_mut().color = color,
            Self::Standard(material) => material.color = color,
            Self::Volume(material) => material.color = color,
            Self::TexturedVolume(material) => material.color = color,
            Self::Isosurface(material) => material.color = color,
        }
    }

    /// Texture sampled by the material, if any
    pub fn texture(&self) -> Option<TextureHandle> {
        match self {
            Self::Flat(_) | Self::Wireframe(_) => None,
            Self::Standard(material) => material.texture,
            Self::Volume(material) => material.texture,
            Self::TexturedVolume(material) => material.texture,
            Self::Isosurface(material) => material.texture,
        }
    }

    /// Attach or detach a texture
    ///
    /// Returns `false` when the material does not sample textures.
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) -> bool {
        match self {
            Self::Flat(_) | Self::Wireframe(_) => {
                log::debug!("{} material ignores textures", self.name());
                false
            }
            Self::Standard(material) => {
                material.texture = texture;
                true
            }
            Self::Volume(material) => {
                material.texture = texture;
                true
            }
            Self::TexturedVolume(material) => {
                material.texture = texture;
                true
            }
            Self::Isosurface(material) => {
                material.texture = texture;
                true
            }
        }
    }

    /// Upload the material's own inputs into the bound program
    ///
    /// Frame-level inputs (ambient, background, lights) are written by
    /// [`Material::render`], not here.
    pub fn set_uniforms(&self, binder: &mut UniformBinder<'_>, camera: &Camera, model: &Mat4) {
        match self {
            Self::Flat(material) => material.set_uniforms(binder, camera, model),
            Self::Wireframe(material) => material.flat().set_uniforms(binder, camera, model),
            Self::Standard(material) => material.set_uniforms(binder, camera, model),
            Self::Volume(material) => material.set_uniforms(binder, camera, model),
            Self::TexturedVolume(material) => material.set_uniforms(binder, camera, model),
            Self::Isosurface(material) => material.set_uniforms(binder, camera, model),
        }
    }

    /// Draw `mesh` with this material
    pub fn render(
        &self,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
        model: &Mat4,
        camera: &Camera,
        frame: &FrameState,
    ) {
        match self {
            Self::Flat(material) => material.render(gpu, mesh, model, camera),
            Self::Wireframe(material) => material.render(gpu, mesh, model, camera),
            Self::Standard(material) => material.render(gpu, mesh, model, camera, frame),
            Self::Volume(material) => material.render(gpu, mesh, model, camera, frame),
            Self::TexturedVolume(material) => material.render(gpu, mesh, model, camera, frame),
            Self::Isosurface(material) => material.render(gpu, mesh, model, camera, frame),
        }
    }

    /// Expose tunable fields to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        match self {
            Self::Flat(material) => material.inspect(ui),
            Self::Wireframe(material) => material.inspect(ui),
            Self::Standard(material) => material.inspect(ui),
            Self::Volume(material) => material.inspect(ui),
            Self::TexturedVolume(material) => material.inspect(ui),
            Self::Isosurface(material) => material.inspect(ui),
        }
    }
}

impl From<FlatMaterial> for Material {
    fn from(material: FlatMaterial) -> Self {
        Self::Flat(material)
    }
}

impl From<WireframeMaterial> for Material {
    fn from(material: WireframeMaterial) -> Self {
        Self::Wireframe(material)
    }
}

impl From<StandardMaterial> for Material {
    fn from(material: StandardMaterial) -> Self {
        Self::Standard(material)
    }
}

impl From<VolumeMaterial> for Material {
    fn from(material: VolumeMaterial) -> Self {
        Self::Volume(material)
    }
}

impl From<TexturedVolumeMaterial> for Material {
    fn from(material: TexturedVolumeMaterial) -> Self {
        Self::TexturedVolume(material)
    }
}

impl From<IsosurfaceMaterial> for Material {
    fn from(material: IsosurfaceMaterial) -> Self {
        Self::Isosurface(material)
    }
}

/// Upload the transform and viewer inputs shared by every program
pub(crate) fn upload_view_uniforms(
    binder: &mut UniformBinder<'_>,
    camera: &Camera,
    model: &Mat4,
) {
    binder.set("u_viewprojection", camera.view_projection());
    binder.set("u_camera_position", camera.eye);
    binder.set("u_model", *model);
}

/// Run `body` with `program` bound, or log and skip when it is not loaded
///
/// Returns whether `body` ran.
pub(crate) fn with_program(
    gpu: &mut dyn RenderBackend,
    program: Option<ProgramHandle>,
    material: &str,
    body: impl FnOnce(&mut dyn RenderBackend, ProgramHandle),
) -> bool {
    let Some(program) = program else {
        let error = RenderError::MissingProgram {
            material: material.to_string(),
        };
        log::warn!("{}, skipping draw", error);
        return false;
    };

    gpu.bind_program(program);
    body(&mut *gpu, program);
    gpu.unbind_program(program);
    true
}

/// Program sources and a preloaded backend shared by the material tests
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::render::{HeadlessBackend, ProgramLibrary};

    pub(crate) const SHADER_DIR: &str = "shaders";

    const BASIC_VS: &str = "
        uniform mat4 u_viewprojection;
        uniform vec3 u_camera_position;
        uniform mat4 u_model;
    ";

    const FLAT_FS: &str = "uniform vec4 u_color;";

    const LIGHT_INPUTS: &str = "
        uniform vec4 u_ambient_light;
        uniform vec4 u_background_light;
        uniform int u_light_type;
        uniform vec3 u_light_position;
        uniform vec3 u_light_direction;
        uniform vec4 u_light_color;
        uniform float u_light_intensity;
        uniform float u_light_shininess;
    ";

    const VOLUME_INPUTS: &str = "
        uniform vec4 u_color;
        uniform sampler3D u_texture;
        uniform vec4 u_ambient_light;
        uniform vec4 u_background_light;
        uniform float u_abs_coef;
        uniform float u_step_length;
        uniform float u_noise_scale;
        uniform float u_noise_detail;
    ";

    const ISOSURFACE_INPUTS: &str = "
        uniform vec4 u_color;
        uniform sampler3D u_texture;
        uniform float u_step_length;
        uniform float u_threshold;
        uniform int u_jittering;
        uniform float u_h;
    ";

    const ISOSURFACE_LIGHT_INPUTS: &str = "
        uniform vec4 u_ambient;
        uniform vec4 u_ks;
        uniform float u_alpha;
    ";

    fn path(file: &str) -> String {
        format!("{}/{}", SHADER_DIR, file)
    }

    /// Backend able to compile every program the materials request
    pub(crate) fn backend() -> HeadlessBackend {
        HeadlessBackend::new()
            .with_source(path("basic.vs"), BASIC_VS)
            .with_source(path("flat.fs"), FLAT_FS)
            .with_source(
                path("basic.fs"),
                format!("uniform vec4 u_color; uniform sampler2D u_texture; {}", LIGHT_INPUTS),
            )
            .with_source(path("normal.fs"), "out vec4 FragColor;")
            .with_source(path("homogeneous.fs"), VOLUME_INPUTS)
            .with_source(path("heterogeneous.fs"), VOLUME_INPUTS)
            .with_source(path("emissive_absorption.fs"), VOLUME_INPUTS)
            .with_source(
                path("density_volume.fs"),
                format!(
                    "{} uniform int u_density_type; uniform float u_scattering_coef; {}",
                    VOLUME_INPUTS, LIGHT_INPUTS
                ),
            )
            .with_source(path("isosurface.fs"), ISOSURFACE_INPUTS)
            .with_source(
                path("isosurface_light.fs"),
                format!(
                    "{} {} {}",
                    ISOSURFACE_INPUTS, ISOSURFACE_LIGHT_INPUTS, LIGHT_INPUTS
                ),
            )
    }

    /// Empty program library rooted at the fixture directory
    pub(crate) fn library() -> ProgramLibrary {
        ProgramLibrary::new(SHADER_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::{HeadlessBackend, Light, RasterState, UniformValue};

    fn frame() -> FrameState {
        FrameState::new(Vec4::new(0.1, 0.1, 0.1, 1.0), Vec4::new(0.9, 0.9, 0.9, 1.0))
    }

    #[test]
    fn test_capabilities_per_family() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();

        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);

        let flat = Material::from(FlatMaterial::new(&mut programs, &mut gpu, white));
        let standard = Material::from(StandardMaterial::new(&mut programs, &mut gpu, white));
        let volume = Material::from(VolumeMaterial::new(&mut programs, &mut gpu, white));
        let textured = Material::from(TexturedVolumeMaterial::new(&mut programs, &mut gpu, white));
        let isosurface = Material::from(IsosurfaceMaterial::new(&mut programs, &mut gpu, white));

        assert!(flat.supports_wireframe());
        assert!(standard.supports_wireframe());
        assert!(standard.capabilities().contains(MaterialCapabilities::MULTI_LIGHT));
        assert!(!volume.supports_wireframe());
        assert!(!isosurface.supports_wireframe());
        assert!(!textured.supports_wireframe());
        assert!(textured.capabilities().contains(MaterialCapabilities::TEXTURED));
        assert!(isosurface.capabilities().contains(MaterialCapabilities::RAY_MARCHED));
    }

    #[test]
    fn test_every_family_leaves_default_state_and_no_program_bound() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let camera = Camera::default();
        let frame = frame()
            .add_light(Light::point(Vec3::new(1.5, 1.5, 1.5), 1.0))
            .add_light(Light::point(Vec3::new(-1.5, 1.5, 1.5), 1.0));
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);

        let materials: Vec<Material> = vec![
            FlatMaterial::new(&mut programs, &mut gpu, white).into(),
            WireframeMaterial::new(&mut programs, &mut gpu, white).into(),
            StandardMaterial::new(&mut programs, &mut gpu, white).into(),
            VolumeMaterial::new(&mut programs, &mut gpu, white).into(),
            TexturedVolumeMaterial::new(&mut programs, &mut gpu, white).into(),
            IsosurfaceMaterial::new(&mut programs, &mut gpu, white).into(),
        ];

        for material in &materials {
            material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &camera, &frame);
            assert_eq!(gpu.raster_state(), RasterState::default(), "{}", material.name());
            assert_eq!(gpu.bound_program(), None, "{}", material.name());
        }
        // flat, wireframe, two standard passes, volume, textured volume, isosurface
        assert_eq!(gpu.draw_count(), 7);
    }

    #[test]
    fn test_missing_program_skips_draw() {
        let mut gpu = HeadlessBackend::new();
        let mut programs = fixtures::library();
        let material =
            Material::from(StandardMaterial::new(&mut programs, &mut gpu, Vec4::zeros()));

        assert_eq!(material.active_program(), None);
        material.render(&mut gpu, MeshHandle(0), &Mat4::identity(), &Camera::default(), &frame());

        assert_eq!(gpu.draw_count(), 0);
        assert!(gpu.commands().is_empty());
    }

    #[test]
    fn test_set_uniforms_writes_shared_inputs() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let material = Material::from(FlatMaterial::new(&mut programs, &mut gpu, red));
        let program = material.active_program().unwrap();
        let camera = Camera::default();
        let model = Mat4::new_translation(&Vec3::new(0.0, 2.0, 0.0));

        {
            let mut binder = UniformBinder::new(&mut gpu, program);
            material.set_uniforms(&mut binder, &camera, &model);
            assert_eq!(binder.mismatches(), 0);
        }

        assert_eq!(gpu.uniform_value(program, "u_model"), Some(&UniformValue::Mat4(model)));
        assert_eq!(
            gpu.uniform_value(program, "u_camera_position"),
            Some(&UniformValue::Vec3(camera.eye))
        );
        assert_eq!(
            gpu.uniform_value(program, "u_color"),
            Some(&UniformValue::Vec4(Vec4::new(1.0, 0.0, 0.0, 1.0)))
        );
    }

    #[test]
    fn test_texture_only_on_textured_families() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let mut flat = Material::from(FlatMaterial::new(&mut programs, &mut gpu, Vec4::zeros()));
        let mut volume =
            Material::from(VolumeMaterial::new(&mut programs, &mut gpu, Vec4::zeros()));

        assert!(!flat.set_texture(Some(TextureHandle(3))));
        assert_eq!(flat.texture(), None);
        assert!(volume.set_texture(Some(TextureHandle(3))));
        assert_eq!(volume.texture(), Some(TextureHandle(3)));
    }
}
