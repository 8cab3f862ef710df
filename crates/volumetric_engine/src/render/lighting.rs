//! Lighting system
//!
//! Lights and the per-frame illumination state. Every material reads the
//! [`FrameState`] during rendering; only the viewer (GUI edits, scene setup,
//! animation) writes it, and only between frames.

use crate::core::config::LightingConfig;
use crate::foundation::math::{Vec3, Vec4};
use crate::render::uniforms::UniformBinder;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Point light (like a lightbulb)
    Point,
    /// Directional light (like sunlight)
    Directional,
}

impl LightType {
    /// Integer tag uploaded as `u_light_type`
    pub fn shader_tag(self) -> i32 {
        match self {
            Self::Point => 0,
            Self::Directional => 1,
        }
    }
}

/// Light source
#[derive(Debug, Clone)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// World position (point lights)
    pub position: Vec3,
    /// Direction the light travels (directional lights)
    pub direction: Vec3,
    /// Light color
    pub color: Vec4,
    /// Specular shininess exponent used by the lit programs
    pub shininess: f32,
    intensity: f32,
}

impl Light {
    /// Create a white point light
    pub fn point(position: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Point,
            position,
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shininess: 20.0,
            intensity: intensity.max(0.0),
        }
    }

    /// Create a white directional light
    pub fn directional(direction: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction: direction
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(|| Vec3::new(0.0, -1.0, 0.0)),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shininess: 20.0,
            intensity: intensity.max(0.0),
        }
    }

    /// Set the light color
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Light intensity (never negative)
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set the intensity, clamping negative values to zero
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = if intensity.is_nan() { 0.0 } else { intensity.max(0.0) };
    }

    /// Place the light on a horizontal circle around the Y axis
    pub fn orbit(&mut self, angle: f32, radius: f32, height: f32) {
        self.position = Vec3::new(radius * angle.cos(), height, radius * angle.sin());
    }

    /// Upload this light's inputs into the active program
    pub fn upload(&self, binder: &mut UniformBinder<'_>) {
        binder.set("u_light_type", self.light_type.shader_tag());
        binder.set("u_light_position", self.position);
        binder.set("u_light_direction", self.direction);
        binder.set("u_light_color", self.color);
        binder.set("u_light_intensity", self.intensity);
        binder.set("u_light_shininess", self.shininess);
    }

    /// Upload light inputs that contribute no illumination
    ///
    /// Used when the frame has no lights so lit programs still see defined values.
    pub fn upload_unlit(binder: &mut UniformBinder<'_>) {
        binder.set("u_light_color", Vec4::zeros());
        binder.set("u_light_intensity", 0.0_f32);
        binder.set("u_light_shininess", 1.0_f32);
    }
}

/// Global illumination for one frame
///
/// Passed explicitly to every material render call.
#[derive(Debug, Clone)]
pub struct FrameState {
    /// Ambient light color
    pub ambient: Vec4,
    /// Background color, also used as the clear color
    pub background: Vec4,
    /// Active lights, in pass order
    pub lights: Vec<Light>,
}

impl FrameState {
    /// Create a frame state without lights
    pub fn new(ambient: Vec4, background: Vec4) -> Self {
        Self {
            ambient,
            background,
            lights: Vec::new(),
        }
    }

    /// Build the frame state described by a configuration section
    pub fn from_config(config: &LightingConfig) -> Self {
        Self::new(Vec4::from(config.ambient), Vec4::from(config.background))
    }

    /// Add a light to the frame
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Number of active lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessBackend, ProgramSource, RenderBackend, UniformValue};
    use approx::assert_relative_eq;

    #[test]
    fn test_intensity_is_never_negative() {
        let mut light = Light::point(Vec3::zeros(), -2.0);
        assert_eq!(light.intensity(), 0.0);

        light.set_intensity(3.0);
        assert_eq!(light.intensity(), 3.0);

        light.set_intensity(f32::NAN);
        assert_eq!(light.intensity(), 0.0);
    }

    #[test]
    fn test_orbit_places_light_on_circle() {
        let mut light = Light::point(Vec3::zeros(), 1.0);
        light.orbit(std::f32::consts::FRAC_PI_2, 4.0, 1.0);

        assert_relative_eq!(light.position, Vec3::new(0.0, 1.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_upload_writes_light_inputs() {
        let mut gpu = HeadlessBackend::new()
            .with_source("basic.vs", "")
            .with_source(
                "basic.fs",
                "uniform vec3 u_light_position; uniform float u_light_intensity; \
                 uniform vec4 u_light_color;",
            );
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "basic.fs")).unwrap();

        let light = Light::point(Vec3::new(1.5, 1.5, 1.5), 3.0);
        let mut binder = UniformBinder::new(&mut gpu, program);
        light.upload(&mut binder);

        assert_eq!(binder.uploaded(), 3);
        assert_eq!(
            gpu.uniform_value(program, "u_light_intensity"),
            Some(&UniformValue::Float(3.0))
        );
    }

    #[test]
    fn test_default_frame_state() {
        let frame = FrameState::default();
        assert_eq!(frame.ambient, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(frame.light_count(), 0);
    }
}
