//! # Viewer Camera
//!
//! Perspective camera consumed by materials. Materials only read two things from
//! it: the view-projection matrix (`u_viewprojection`) and the eye position
//! (`u_camera_position`). The interactive operations (orbit and scroll zoom)
//! belong to the viewer and never run while a frame is being rendered.
//!
//! Uses a right-handed, Y-up world with OpenGL clip conventions.

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// 3D perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub eye: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in degrees
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Lower zoom bound for `fov`
    pub min_fov: f32,

    /// Upper zoom bound for `fov`
    pub max_fov: f32,

    /// Field of view change per scroll notch
    pub zoom_step: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `eye` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(eye: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            eye,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: fov_degrees,
            aspect,
            near,
            far,
            min_fov: 10.0,
            max_fov: 110.0,
            zoom_step: 4.0,
        }
    }

    /// Build the camera described by a configuration section
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::perspective(
            Vec3::from(config.eye),
            config.fov_degrees,
            config.aspect,
            config.near,
            config.far,
        );
        camera.look_at(Vec3::from(config.eye), Vec3::from(config.target), Vec3::from(config.up));
        camera.min_fov = config.min_fov_degrees;
        camera.max_fov = config.max_fov_degrees;
        camera.zoom_step = config.zoom_step_degrees;
        camera.fov = utils::clamp_to_range(camera.fov, camera.min_fov, Some(camera.max_fov));
        for _ in 0..config.initial_scroll.unsigned_abs() {
            camera.zoom(config.initial_scroll.signum() as f32);
        }
        camera
    }

    /// Place the camera at `eye` looking at `target`
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        log::trace!("Camera looking from {:?} at {:?}", eye, target);
    }

    /// Update the aspect ratio after a viewport resize
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 && aspect.is_finite() {
            self.aspect = aspect;
        }
    }

    /// World to view space transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.eye), &Point3::from(self.target), &self.up)
    }

    /// View to clip space transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, utils::deg_to_rad(self.fov), self.near, self.far)
    }

    /// Combined world to clip space transform
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate the eye around the target
    ///
    /// `yaw` turns around the up axis, `pitch` tilts towards it. Pitch stops just
    /// short of the poles so the view basis never degenerates.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.eye - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let current_yaw = offset.z.atan2(offset.x);
        let current_pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let limit = 89.0_f32.to_radians();

        let new_yaw = current_yaw + yaw;
        let new_pitch = (current_pitch + pitch).clamp(-limit, limit);

        self.eye = self.target
            + Vec3::new(
                radius * new_pitch.cos() * new_yaw.cos(),
                radius * new_pitch.sin(),
                radius * new_pitch.cos() * new_yaw.sin(),
            );
    }

    /// Apply a scroll-wheel zoom
    ///
    /// Scrolling down widens the field of view, scrolling up narrows it; the
    /// result is clamped to `[min_fov, max_fov]`.
    pub fn zoom(&mut self, scroll: f32) {
        if scroll < 0.0 {
            self.fov += self.zoom_step;
        } else if scroll > 0.0 {
            self.fov -= self.zoom_step;
        }
        self.fov = utils::clamp_to_range(self.fov, self.min_fov, Some(self.max_fov));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}
