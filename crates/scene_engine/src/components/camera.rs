//! Perspective camera component

use crate::component::{Component, NodeContext};
use crate::foundation::math::{utils, Mat4};
use crate::input::Viewport;
use nalgebra::Perspective3;
use serde::{Deserialize, Serialize};

/// Perspective projection attached to a node.
///
/// The view matrix is the inverse of the node's world transform. The first
/// camera initialized in a scene becomes its active camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    #[serde(skip)]
    projection: Mat4,
    #[serde(skip)]
    viewport: Option<Viewport>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.01,
            far: 1000.0,
            projection: Mat4::identity(),
            viewport: None,
        }
    }
}

impl Camera {
    /// Camera with the given field of view (degrees) and default clip planes
    pub fn with_fov(fov: f32) -> Self {
        Self {
            fov,
            ..Self::default()
        }
    }

    /// Projection matrix for the last seen viewport
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Projection times view, for a camera node with the given world transform
    pub fn view_projection(&self, world: &Mat4) -> Mat4 {
        let view = world.try_inverse().unwrap_or_else(Mat4::identity);
        self.projection * view
    }

    fn refresh_projection(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if self.fov <= 0.0 || self.far <= self.near {
            log::warn!(
                "Camera has degenerate frustum (fov {}, near {}, far {}), keeping previous projection",
                self.fov,
                self.near,
                self.far
            );
            return;
        }
        self.projection = Perspective3::new(
            viewport.aspect(),
            utils::deg_to_rad(self.fov),
            self.near,
            self.far,
        )
        .to_homogeneous();
    }
}

impl Component for Camera {
    fn type_name(&self) -> &'static str {
        "Camera"
    }

    fn initialize(&mut self, node: &mut NodeContext<'_>) {
        if node.scene().active_camera().is_none() {
            log::info!("Camera on {} is now the active camera", node.name());
            let id = node.node_id();
            node.scene_mut().set_active_camera(Some(id));
        }
        self.refresh_projection(node.scene().viewport());
    }

    fn update(&mut self, node: &mut NodeContext<'_>) {
        let viewport = node.scene().viewport();
        if self.viewport != Some(viewport) {
            self.refresh_projection(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_camera_becomes_active() {
        let mut scene = Scene::new();
        let root = scene.root();
        let first = scene.new_child(root, "first").unwrap();
        let second = scene.new_child(root, "second").unwrap();

        scene.add_component(first, Camera::default()).unwrap();
        scene.add_component(second, Camera::default()).unwrap();

        assert_eq!(scene.state().active_camera(), Some(first));
    }

    #[test]
    fn test_projection_follows_viewport() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.state_mut().set_viewport(Viewport::new(800, 800));
        scene.add_component(root, Camera::default()).unwrap();

        let square = *scene.component_of::<Camera>(root).unwrap().projection();
        assert_relative_eq!(square[(0, 0)], square[(1, 1)], epsilon = 1e-6);

        scene.state_mut().set_viewport(Viewport::new(1600, 800));
        scene.update_tree();

        let wide = *scene.component_of::<Camera>(root).unwrap().projection();
        assert_relative_eq!(wide[(0, 0)] * 2.0, wide[(1, 1)], epsilon = 1e-6);
    }

    #[test]
    fn test_view_is_inverse_of_world() {
        let camera = Camera::default();
        let world = utils::translation(0.0, 0.0, 5.0);
        let expected = camera.projection() * utils::translation(0.0, 0.0, -5.0);
        assert_relative_eq!(camera.view_projection(&world), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_frustum_keeps_identity() {
        let mut scene = Scene::new();
        let root = scene.root();
        let camera = Camera {
            near: 10.0,
            far: 10.0,
            ..Camera::default()
        };
        scene.add_component(root, camera).unwrap();
        assert_eq!(*scene.component_of::<Camera>(root).unwrap().projection(), Mat4::identity());
    }

    #[test]
    fn test_payload_skips_runtime_state() {
        let json = serde_json::to_value(Camera::with_fov(60.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "fov": 60.0, "near": 0.01f32, "far": 1000.0 }));

        let decoded: Camera = serde_json::from_str(r#"{"fov": 30}"#).unwrap();
        assert_eq!(decoded.fov, 30.0);
        assert_eq!(decoded.far, 1000.0);
    }
}
