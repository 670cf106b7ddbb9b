//! Mesh renderer component
//!
//! Issues one draw call per frame for its mesh at the node's world transform.

use crate::backend::DrawCall;
use crate::component::{Component, NodeContext, RenderContext};
use serde::{Deserialize, Serialize};

/// Draws a mesh asset at its node's world transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRenderer {
    /// Mesh asset name
    pub mesh: String,
    /// Material name; the backend's default material when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Hidden renderers issue no draw calls
    pub visible: bool,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            mesh: String::new(),
            material: None,
            visible: true,
        }
    }
}

impl MeshRenderer {
    /// Visible renderer for `mesh` with the default material
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            ..Self::default()
        }
    }

    /// Use the named material
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

impl Component for MeshRenderer {
    fn type_name(&self) -> &'static str {
        "MeshRenderer"
    }

    fn initialize(&mut self, node: &mut NodeContext<'_>) {
        if self.mesh.is_empty() {
            log::warn!("MeshRenderer on {} has no mesh", node.name());
        }
    }

    fn render(&self, node: &mut RenderContext<'_>) {
        if !self.visible || self.mesh.is_empty() {
            return;
        }
        let call = DrawCall {
            mesh: self.mesh.clone(),
            material: self.material.clone(),
            model: *node.world_transform(),
        };
        node.backend().draw_mesh(&call);
    }
}
