//! Built-in components

mod camera;
mod mesh_renderer;
mod orbit_camera;

pub use camera::Camera;
pub use mesh_renderer::MeshRenderer;
pub use orbit_camera::OrbitCamera;

use crate::error::SceneResult;
use crate::registry::ComponentRegistry;

/// Register every built-in component type
pub fn register_builtins(registry: &mut ComponentRegistry) -> SceneResult<()> {
    registry.register::<Camera>()?;
    registry.register::<OrbitCamera>()?;
    registry.register::<MeshRenderer>()?;
    Ok(())
}
