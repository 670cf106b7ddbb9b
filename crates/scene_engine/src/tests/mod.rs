//! Shared test fixtures and cross-module scenarios

mod scenarios;

use crate::backend::DrawCall;
use crate::component::{Component, NodeContext, RenderContext};
use crate::node::NodeId;
use crate::registry::ComponentRegistry;
use serde::{Deserialize, Serialize};

/// Component that counts its lifecycle calls
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TestComponent {
    pub value: i64,
    #[serde(skip)]
    pub initialize_called: u32,
    #[serde(skip)]
    pub update_called: u32,
    #[serde(skip)]
    pub node: Option<NodeId>,
    #[serde(skip)]
    pub name_at_initialize: Option<String>,
}

impl Component for TestComponent {
    fn type_name(&self) -> &'static str {
        "testComponent"
    }

    fn initialize(&mut self, node: &mut NodeContext<'_>) {
        self.initialize_called += 1;
        self.node = Some(node.node_id());
        self.name_at_initialize = Some(node.name().to_string());
    }

    fn update(&mut self, _node: &mut NodeContext<'_>) {
        self.update_called += 1;
    }

    // Draws its node name so tests can observe render order
    fn render(&self, node: &mut RenderContext<'_>) {
        let call = DrawCall {
            mesh: node.name().to_string(),
            material: None,
            model: *node.world_transform(),
        };
        node.backend().draw_mesh(&call);
    }
}

/// Built-ins plus [`TestComponent`]
pub(crate) fn test_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::with_builtins().unwrap();
    registry.register::<TestComponent>().unwrap();
    registry
}
