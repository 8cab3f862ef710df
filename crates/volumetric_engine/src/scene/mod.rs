//! Scene management
//!
//! A flat list of [`SceneNode`]s plus the camera and the frame lighting state.
//! [`Scene::render`] runs one frame: clear to the background color, reset the
//! raster state, draw every visible node, then the optional wireframe overlay.
//!
//! ## Frame protocol
//!
//! ```text
//! clear(background) → default raster state
//!      ↓
//! for each node: material.render(mesh, model, camera, frame)
//!      ↓
//! show_wireframe? → overlay.render(mesh, model, camera) for supporting nodes
//! ```

mod node;

pub use node::SceneNode;

use crate::core::config::{SceneTechnique, ViewerConfig};
use crate::foundation::math::{Vec3, Vec4};
use crate::render::{
    Camera, DragRange, FlatMaterial, FrameState, Inspector, IsosurfaceMaterial, Light, Material,
    MeshHandle, ProgramLibrary, RasterState, RenderBackend, StandardMaterial,
    TexturedVolumeMaterial, VolumeMaterial, WireframeMaterial,
};

/// Work done by one [`Scene::render`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued during the frame
    pub draw_calls: u64,
    /// Visible nodes rendered
    pub nodes_rendered: usize,
    /// Wireframe overlays drawn
    pub wireframes_rendered: usize,
}

/// Light animation along a horizontal circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOrbit {
    /// Current angle in radians
    pub angle: f32,
    /// Circle radius
    pub radius: f32,
    /// Height above the origin
    pub height: f32,
    /// Angular speed in radians per second
    pub speed: f32,
}

impl LightOrbit {
    /// Advance by `dt` seconds and move `light` to the new position
    pub fn advance(&mut self, dt: f32, light: &mut Light) {
        self.angle += self.speed * dt;
        light.orbit(self.angle, self.radius, self.height);
    }
}

/// Renderable scene
#[derive(Debug, Clone)]
pub struct Scene {
    /// Nodes in draw order
    pub nodes: Vec<SceneNode>,
    /// Lighting shared by every material
    pub frame: FrameState,
    /// Viewer camera
    pub camera: Camera,
    /// Whether the wireframe overlay is drawn
    pub show_wireframe: bool,
    /// Animation of the first light, if any
    pub light_orbit: Option<LightOrbit>,
    /// Yaw speed of the camera around its target in radians per second
    pub camera_orbit_speed: f32,
    overlay: Option<WireframeMaterial>,
}

impl Scene {
    /// Light intensity slider
    pub const LIGHT_INTENSITY_RANGE: DragRange = DragRange::new(0.1, 0.0);

    /// Create an empty scene
    pub fn new(camera: Camera, frame: FrameState) -> Self {
        Self {
            nodes: Vec::new(),
            frame,
            camera,
            show_wireframe: false,
            light_orbit: None,
            camera_orbit_speed: 0.0,
            overlay: None,
        }
    }

    /// Build the demo scene for the configured technique
    ///
    /// One node of the configured material on `mesh`, plus a point light that
    /// orbits the origin when enabled. The camera turns around its target at the
    /// configured orbit speed.
    pub fn showcase(
        config: &ViewerConfig,
        programs: &mut ProgramLibrary,
        gpu: &mut dyn RenderBackend,
        mesh: MeshHandle,
    ) -> Self {
        let scene_config = &config.scene;
        let color = Vec4::from(scene_config.color);

        let material: Material = match scene_config.technique {
            SceneTechnique::Flat => FlatMaterial::new(programs, gpu, color).into(),
            SceneTechnique::Standard => StandardMaterial::new(programs, gpu, color).into(),
            SceneTechnique::Volume => VolumeMaterial::new(programs, gpu, color).into(),
            SceneTechnique::TexturedVolume => {
                TexturedVolumeMaterial::new(programs, gpu, color).into()
            }
            SceneTechnique::Isosurface => IsosurfaceMaterial::new(programs, gpu, color).into(),
        };

        let mut frame = FrameState::from_config(&config.lighting);
        frame.lights.push(Light::point(Vec3::new(1.5, 1.5, 1.5), scene_config.light_intensity));

        let mut scene = Self::new(Camera::from_config(&config.camera), frame);
        let name = format!("{:?}", scene_config.technique);
        scene.add_node(SceneNode::new(name, mesh, material));
        scene.show_wireframe = scene_config.show_wireframe;
        scene.camera_orbit_speed = config.camera.orbit_speed;
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        scene.overlay = Some(WireframeMaterial::new(programs, gpu, white));

        if scene_config.orbiting_light {
            scene.light_orbit = Some(LightOrbit {
                angle: 0.0,
                radius: scene_config.orbit_radius,
                height: scene_config.orbit_height,
                speed: scene_config.orbit_speed,
            });
        }

        log::info!(
            "Built {:?} scene with {} node(s) and {} light(s)",
            scene_config.technique,
            scene.nodes.len(),
            scene.frame.light_count()
        );
        scene
    }

    /// Set the material used for the wireframe overlay
    pub fn with_wireframe_overlay(mut self, overlay: WireframeMaterial) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Append a node, returning its index
    pub fn add_node(&mut self, node: SceneNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Find a node by name
    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Find a node by name, mutably
    pub fn node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|node| node.name == name)
    }

    /// Advance animations by `dt` seconds
    ///
    /// Must run between frames.
    pub fn update(&mut self, dt: f32) {
        let light = self.frame.lights.first_mut();
        if let (Some(orbit), Some(light)) = (self.light_orbit.as_mut(), light) {
            orbit.advance(dt, light);
        }
        if self.camera_orbit_speed != 0.0 {
            self.camera.orbit(self.camera_orbit_speed * dt, 0.0);
        }
    }

    /// Render one frame
    pub fn render(&self, gpu: &mut dyn RenderBackend) -> FrameStats {
        let draws_before = gpu.draw_count();
        let mut stats = FrameStats::default();

        gpu.clear(self.frame.background);
        gpu.set_raster_state(RasterState::default());

        for node in self.nodes.iter().filter(|node| node.visible) {
            node.render(gpu, &self.camera, &self.frame);
            stats.nodes_rendered += 1;
        }

        if self.show_wireframe {
            if let Some(overlay) = &self.overlay {
                for node in &self.nodes {
                    if node.render_wireframe(gpu, overlay, &self.camera) {
                        stats.wireframes_rendered += 1;
                    }
                }
            }
        }

        stats.draw_calls = gpu.draw_count() - draws_before;
        log::debug!(
            "Frame: {} draw call(s), {} node(s), {} wireframe(s)",
            stats.draw_calls,
            stats.nodes_rendered,
            stats.wireframes_rendered
        );
        stats
    }

    /// Expose scene lighting and every node to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        ui.color_edit("Ambient Light", &mut self.frame.ambient);
        ui.color_edit("Background", &mut self.frame.background);
        ui.checkbox("Wireframe", &mut self.show_wireframe);
        for light in &mut self.frame.lights {
            let mut intensity = light.intensity();
            if ui.drag_float("Light Intensity", &mut intensity, Self::LIGHT_INTENSITY_RANGE) {
                light.set_intensity(intensity);
            }
        }
        for node in &mut self.nodes {
            node.inspect(ui);
        }
    }
}
