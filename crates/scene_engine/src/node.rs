//! Scene nodes
//!
//! A node owns its transform and components. Children are owned by the scene's
//! node arena and referenced by [`NodeId`]; the parent link is a plain id and
//! never keeps anything alive.

use crate::component::{self, Component};
use crate::foundation::math::Mat4;
use crate::transform::Transform;
use std::collections::BTreeMap;
use std::fmt;

slotmap::new_key_type! {
    /// Handle of a node inside a scene's node arena
    pub struct NodeId;
}

/// Named entity of the scene hierarchy
pub struct Node {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) components: BTreeMap<String, Box<dyn Component>>,
    pub(crate) world_transform: Mat4,
    pub(crate) mount: Option<String>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            parent,
            children: BTreeMap::new(),
            components: BTreeMap::new(),
            world_transform: Mat4::identity(),
            mount: None,
        }
    }

    /// Name, unique among siblings
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node; `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Local transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable local transform
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// World transform computed by the most recent update traversal.
    ///
    /// Identity until the node has been traversed once.
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Asset name this node was marked to receive, if any
    pub fn mount(&self) -> Option<&str> {
        self.mount.as_deref()
    }

    /// Child with the given name
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    /// Children as `(name, id)` pairs
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Component with the given type name
    pub fn component(&self, type_name: &str) -> Option<&dyn Component> {
        self.components.get(type_name).map(Box::as_ref)
    }

    /// Mutable component with the given type name
    pub fn component_mut(&mut self, type_name: &str) -> Option<&mut (dyn Component + 'static)> {
        self.components.get_mut(type_name).map(Box::as_mut)
    }

    /// First component of concrete type `T`
    pub fn component_of<T: Component>(&self) -> Option<&T> {
        self.components
            .values()
            .find_map(|c| component::downcast_ref::<T>(c.as_ref()))
    }

    /// First mutable component of concrete type `T`
    pub fn component_of_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .values_mut()
            .find_map(|c| component::downcast_mut::<T>(c.as_mut()))
    }

    /// Whether a component with the given type name is attached
    pub fn has_component(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    /// Type names of the attached components
    pub fn component_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.keys().map(String::as_str)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("transform", &self.transform)
            .field("children", &self.children)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("mount", &self.mount)
            .finish()
    }
}
