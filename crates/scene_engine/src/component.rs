//! Component contract
//!
//! A component is a behavior attached to exactly one node. The scene calls
//! [`Component::initialize`] once when the component is attached, then
//! [`Component::update`] and [`Component::render`] once per frame.
//!
//! Components are stored as trait objects keyed by [`Component::type_name`],
//! the same string the [`ComponentRegistry`](crate::registry::ComponentRegistry)
//! uses, so a document and an explicit `add_component` agree on identity.
//!
//! The document payload of a component is its serde representation. Runtime
//! state that must not be saved is marked `#[serde(skip)]`, and types put
//! `#[serde(default)]` on the struct so missing fields keep their zero value.

use crate::backend::RenderBackend;
use crate::foundation::math::Mat4;
use crate::node::NodeId;
use crate::scene::SceneState;
use crate::transform::Transform;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;

/// Behavior attached to a scene node
pub trait Component: AsAny + ComponentPayload {
    /// Stable type name, used as the storage key and in documents
    fn type_name(&self) -> &'static str;

    /// Called exactly once when the component is attached to a live node
    fn initialize(&mut self, _node: &mut NodeContext<'_>) {}

    /// Called once per frame after the node's world transform is recomputed
    fn update(&mut self, _node: &mut NodeContext<'_>) {}

    /// Called once per frame after the update pass; must not change state
    fn render(&self, _node: &mut RenderContext<'_>) {}
}

/// Downcasting support for component trait objects
pub trait AsAny: Any {
    /// View as `Any`
    fn as_any(&self) -> &dyn Any;

    /// View as mutable `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Document payload of a component
pub trait ComponentPayload {
    /// Encode the persistent fields
    fn encode_payload(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Replace the persistent fields with the decoded payload
    fn decode_payload(&mut self, payload: serde_json::Value) -> Result<(), serde_json::Error>;
}

impl<T: Serialize + DeserializeOwned> ComponentPayload for T {
    fn encode_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn decode_payload(&mut self, payload: serde_json::Value) -> Result<(), serde_json::Error> {
        *self = serde_json::from_value(payload)?;
        Ok(())
    }
}

/// Downcast a component trait object to its concrete type
pub fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

/// Downcast a mutable component trait object to its concrete type
pub fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Mutable view of the owning node handed to `initialize` and `update`
pub struct NodeContext<'a> {
    pub(crate) node: NodeId,
    pub(crate) name: &'a str,
    pub(crate) transform: &'a mut Transform,
    pub(crate) world_transform: &'a Mat4,
    pub(crate) scene: &'a mut SceneState,
}

impl<'a> NodeContext<'a> {
    /// Id of the owning node
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Name of the owning node
    pub fn name(&self) -> &str {
        self.name
    }

    /// Local transform of the owning node
    pub fn transform(&self) -> &Transform {
        &*self.transform
    }

    /// Mutable local transform of the owning node.
    ///
    /// Changes are reflected in the world transform on the next traversal.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut *self.transform
    }

    /// World transform computed by the current traversal
    pub fn world_transform(&self) -> &Mat4 {
        self.world_transform
    }

    /// Scene-wide state (active camera, viewport, frame input)
    pub fn scene(&self) -> &SceneState {
        &*self.scene
    }

    /// Mutable scene-wide state
    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut *self.scene
    }
}

/// Read-only view of the owning node handed to `render`
pub struct RenderContext<'a> {
    pub(crate) node: NodeId,
    pub(crate) name: &'a str,
    pub(crate) world_transform: &'a Mat4,
    pub(crate) backend: &'a mut dyn RenderBackend,
}

impl<'a> RenderContext<'a> {
    /// Id of the owning node
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Name of the owning node
    pub fn name(&self) -> &str {
        self.name
    }

    /// World transform computed by the last update pass
    pub fn world_transform(&self) -> &Mat4 {
        self.world_transform
    }

    /// Rendering backend receiving draw calls
    pub fn backend(&mut self) -> &mut (dyn RenderBackend + 'a) {
        &mut *self.backend
    }
}
