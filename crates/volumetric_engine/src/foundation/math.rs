//! Math utilities and types
//!
//! Provides the fundamental math types used by the viewer. Everything is a thin
//! alias over `nalgebra` so uniform values can be handed to a backend unchanged.

pub use nalgebra::{Matrix4, Point3 as NPoint3, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type, also used for RGBA colors
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = NPoint3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec4};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value to a lower bound and an optional upper bound
    ///
    /// NaN inputs collapse to `min` so a bad GUI edit can never reach a shader.
    pub fn clamp_to_range(value: f32, min: f32, max: Option<f32>) -> f32 {
        if value.is_nan() || value < min {
            return min;
        }
        match max {
            Some(max) if value > max => max,
            _ => value,
        }
    }

    /// Whether any of the RGB channels of a color is non-zero
    pub fn has_visible_rgb(color: &Vec4) -> bool {
        color.x != 0.0 || color.y != 0.0 || color.z != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(utils::clamp_to_range(-1.0, 0.0, None), 0.0);
        assert_eq!(utils::clamp_to_range(5.0, 0.0, Some(2.0)), 2.0);
        assert_eq!(utils::clamp_to_range(1.5, 0.0, Some(2.0)), 1.5);
        assert_eq!(utils::clamp_to_range(f32::NAN, 0.0001, None), 0.0001);
    }

    #[test]
    fn test_visible_rgb_ignores_alpha() {
        assert!(!utils::has_visible_rgb(&Vec4::new(0.0, 0.0, 0.0, 1.0)));
        assert!(utils::has_visible_rgb(&Vec4::new(0.0, 0.1, 0.0, 0.0)));
    }
}
