//! Scene node
//!
//! Pairs a mesh with an exclusively owned material and a model transform, and
//! forwards render calls to the material.

use crate::foundation::math::Mat4;
use crate::render::{
    Camera, FrameState, Inspector, Material, MeshHandle, RenderBackend, WireframeMaterial,
};

/// Drawable object of the scene
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Display name
    pub name: String,

    /// Mesh shared with other nodes
    pub mesh: MeshHandle,

    /// Material owned by this node
    pub material: Material,

    /// Object to world transform
    pub model: Mat4,

    /// Whether the node is drawn
    pub visible: bool,
}

impl SceneNode {
    /// Create a visible node at the origin
    pub fn new(name: impl Into<String>, mesh: MeshHandle, material: impl Into<Material>) -> Self {
        Self {
            name: name.into(),
            mesh,
            material: material.into(),
            model: Mat4::identity(),
            visible: true,
        }
    }

    /// Set the model transform
    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    /// Draw the node with its material
    pub fn render(&self, gpu: &mut dyn RenderBackend, camera: &Camera, frame: &FrameState) {
        if !self.visible {
            return;
        }
        self.material.render(gpu, self.mesh, &self.model, camera, frame);
    }

    /// Draw the node's edges with `overlay`
    ///
    /// Does nothing for hidden nodes or materials without wireframe support.
    /// Returns whether the overlay was drawn.
    pub fn render_wireframe(
        &self,
        gpu: &mut dyn RenderBackend,
        overlay: &WireframeMaterial,
        camera: &Camera,
    ) -> bool {
        if !self.visible || !self.material.supports_wireframe() {
            return false;
        }
        overlay.render(gpu, self.mesh, &self.model, camera);
        true
    }

    /// Expose the node's material to a menu renderer
    pub fn inspect(&mut self, ui: &mut dyn Inspector) {
        ui.checkbox("Visible", &mut self.visible);
        self.material.inspect(ui);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, Vec4};
    use crate::render::material::fixtures;
    use crate::render::{FlatMaterial, IsosurfaceMaterial, PolygonMode, UniformValue};

    #[test]
    fn test_render_delegates_with_node_transform() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let model = Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0));
        let node = SceneNode::new(
            "Cube",
            MeshHandle(5),
            FlatMaterial::new(&mut programs, &mut gpu, Vec4::new(1.0, 1.0, 1.0, 1.0)),
        )
        .with_model(model);

        node.render(&mut gpu, &Camera::default(), &FrameState::default());

        let draw = &gpu.draws()[0];
        assert_eq!(draw.mesh, MeshHandle(5));
        assert_eq!(draw.uniform("u_model"), Some(&UniformValue::Mat4(model)));
    }

    #[test]
    fn test_hidden_node_draws_nothing() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let mut node = SceneNode::new(
            "Cube",
            MeshHandle(0),
            FlatMaterial::new(&mut programs, &mut gpu, Vec4::zeros()),
        );
        node.visible = false;

        node.render(&mut gpu, &Camera::default(), &FrameState::default());
        assert_eq!(gpu.draw_count(), 0);
    }

    #[test]
    fn test_wireframe_only_for_supporting_materials() {
        let mut gpu = fixtures::backend();
        let mut programs = fixtures::library();
        let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let overlay = WireframeMaterial::new(&mut programs, &mut gpu, white);
        let camera = Camera::default();

        let flat = SceneNode::new(
            "Flat",
            MeshHandle(0),
            FlatMaterial::new(&mut programs, &mut gpu, Vec4::zeros()),
        );
        let isosurface = SceneNode::new(
            "Isosurface",
            MeshHandle(1),
            IsosurfaceMaterial::new(&mut programs, &mut gpu, Vec4::zeros()),
        );

        assert!(flat.render_wireframe(&mut gpu, &overlay, &camera));
        assert!(!isosurface.render_wireframe(&mut gpu, &overlay, &camera));

        assert_eq!(gpu.draws().len(), 1);
        assert_eq!(gpu.draws()[0].state.polygon_mode, PolygonMode::Line);
    }
}
