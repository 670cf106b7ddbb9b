//! Scene: node arena, hierarchy operations and per-frame traversal
//!
//! The scene owns every node in a generational arena. A child is created
//! through [`Scene::new_child`] and released with [`Scene::remove_child`],
//! which drops the whole subtree together with its components.
//!
//! Traversal is depth-first and single-threaded. `update` recomputes each
//! node's world transform from its parent before calling the node's
//! components, then descends; `render` only reads what `update` produced.

use crate::backend::RenderBackend;
use crate::component::{Component, NodeContext, RenderContext};
use crate::components::Camera;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::input::{FrameInput, Viewport};
use crate::mount::MountRequest;
use crate::node::{Node, NodeId};
use slotmap::SlotMap;

/// Name given to the root node of every scene
pub const ROOT_NAME: &str = "root";

/// Scene-wide state visible to components
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    active_camera: Option<NodeId>,
    viewport: Viewport,
    input: FrameInput,
}

impl SceneState {
    /// Node whose `Camera` drives the view/projection handoff
    pub fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// Designate the node whose `Camera` drives the view/projection handoff
    pub fn set_active_camera(&mut self, node: Option<NodeId>) {
        self.active_camera = node;
    }

    /// Current drawable area
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the drawable area; cameras pick the change up on their next update
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Input snapshot for the current frame
    pub fn input(&self) -> &FrameInput {
        &self.input
    }

    /// Mutable input snapshot, filled by the outer loop before `update`
    pub fn input_mut(&mut self) -> &mut FrameInput {
        &mut self.input
    }
}

/// A tree of nodes with components, updated and rendered once per frame
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) state: SceneState,
    pub(crate) mounts: Vec<MountRequest>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding only an empty root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(ROOT_NAME, None));
        Self {
            nodes,
            root,
            state: SceneState::default(),
            mounts: Vec::new(),
        }
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node by id
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Whether `id` refers to a node of this scene
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Scene-wide state
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Mutable scene-wide state
    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    /// Create an empty child of `parent`.
    ///
    /// Fails with [`SceneError::DuplicateChild`] when `parent` already has a
    /// child of that name; the tree is left unchanged.
    pub fn new_child(&mut self, parent: NodeId, name: &str) -> SceneResult<NodeId> {
        let parent_node = self.nodes.get(parent).ok_or(SceneError::NodeNotFound)?;
        if parent_node.children.contains_key(name) {
            return Err(SceneError::DuplicateChild {
                parent: parent_node.name.clone(),
                name: name.to_string(),
            });
        }

        let child = self.nodes.insert(Node::new(name, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.insert(name.to_string(), child);
        }
        log::debug!("Created node {}", name);
        Ok(child)
    }

    /// Attach a component to a node.
    ///
    /// Fails with [`SceneError::DuplicateComponent`] when a component of the
    /// same type name is already attached; in that case `initialize` is not
    /// called and the node is unchanged. Otherwise `initialize` runs
    /// synchronously before the component is stored.
    pub fn add_component<C: Component>(&mut self, node: NodeId, component: C) -> SceneResult<()> {
        self.add_boxed_component(node, Box::new(component))
    }

    /// Attach an already boxed component; see [`Scene::add_component`]
    pub fn add_boxed_component(
        &mut self,
        node: NodeId,
        mut component: Box<dyn Component>,
    ) -> SceneResult<()> {
        let type_name = component.type_name();
        let target = self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound)?;
        if target.components.contains_key(type_name) {
            return Err(SceneError::DuplicateComponent {
                node: target.name.clone(),
                type_name: type_name.to_string(),
            });
        }

        let mut context = NodeContext {
            node,
            name: &target.name,
            transform: &mut target.transform,
            world_transform: &target.world_transform,
            scene: &mut self.state,
        };
        component.initialize(&mut context);

        log::debug!("Attached {} to {}", type_name, target.name);
        target.components.insert(type_name.to_string(), component);
        Ok(())
    }

    /// Child of `node` with the given name
    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(node)?.child(name)
    }

    /// Component of `node` with the given type name
    pub fn component(&self, node: NodeId, type_name: &str) -> Option<&dyn Component> {
        self.nodes.get(node)?.component(type_name)
    }

    /// Component of `node` with concrete type `T`
    pub fn component_of<T: Component>(&self, node: NodeId) -> Option<&T> {
        self.nodes.get(node)?.component_of::<T>()
    }

    /// Mutable component of `node` with concrete type `T`
    pub fn component_of_mut<T: Component>(&mut self, node: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(node)?.component_of_mut::<T>()
    }

    /// World transform computed by the most recent update traversal
    pub fn world_transform(&self, node: NodeId) -> Option<Mat4> {
        self.nodes.get(node).map(|n| n.world_transform)
    }

    /// Release the named child of `parent` and everything below it.
    ///
    /// Returns `false` when no such child exists.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> SceneResult<bool> {
        let parent_node = self.nodes.get_mut(parent).ok_or(SceneError::NodeNotFound)?;
        let Some(child) = parent_node.children.remove(name) else {
            return Ok(false);
        };

        let released = self.descendants(child);
        for id in &released {
            self.nodes.remove(*id);
        }

        if self
            .state
            .active_camera
            .is_some_and(|camera| !self.nodes.contains_key(camera))
        {
            log::debug!("Active camera released with subtree {}", name);
            self.state.active_camera = None;
        }
        let nodes = &self.nodes;
        self.mounts.retain(|mount| nodes.contains_key(mount.node));

        log::debug!("Released subtree {} ({} nodes)", name, released.len());
        Ok(true)
    }

    /// `node` and all of its descendants in depth-first pre-order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(current) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(current.children.values().rev().copied());
        }
        order
    }

    /// Slash-separated path of `node` below the root (`""` for the root)
    pub fn path(&self, node: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.nodes.get(node)?;
        while let Some(parent) = current.parent {
            names.push(current.name.as_str());
            current = self.nodes.get(parent)?;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Node at a slash-separated path below the root
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |node, segment| self.child(node, segment))
    }

    /// View/projection and eye position of the active camera, if any
    pub fn view_projection(&self) -> Option<(Mat4, Vec3)> {
        let node = self.nodes.get(self.state.active_camera?)?;
        let camera = node.component_of::<Camera>()?;
        Some((
            camera.view_projection(&node.world_transform),
            utils::translation_of(&node.world_transform),
        ))
    }

    /// Per-frame update.
    ///
    /// Hands the active camera's view/projection to the backend, then walks
    /// the tree recomputing world transforms and updating components.
    pub fn update(&mut self, backend: &mut dyn RenderBackend) {
        if let Some((view_projection, eye)) = self.view_projection() {
            backend.set_view_projection(&view_projection, &eye);
        }
        self.update_tree();
    }

    /// Walk the tree recomputing world transforms and updating components.
    ///
    /// The root's world transform is always identity; its local transform is
    /// not applied. Each other node's world transform is computed before its
    /// components update, and children see the value computed for their
    /// parent in the same pass.
    pub fn update_tree(&mut self) {
        let mut stack = vec![(self.root, None)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            node.world_transform = match parent_world {
                Some(parent_world) => parent_world * node.transform.matrix(),
                None => Mat4::identity(),
            };
            let world = node.world_transform;

            let mut context = NodeContext {
                node: id,
                name: &node.name,
                transform: &mut node.transform,
                world_transform: &world,
                scene: &mut self.state,
            };
            for component in node.components.values_mut() {
                component.update(&mut context);
            }

            stack.extend(node.children.values().rev().map(|child| (*child, Some(world))));
        }
    }

    /// Per-frame render: every component's `render`, depth-first
    pub fn render(&self, backend: &mut dyn RenderBackend) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };

            let mut context = RenderContext {
                node: id,
                name: &node.name,
                world_transform: &node.world_transform,
                backend: &mut *backend,
            };
            for component in node.components.values() {
                component.render(&mut context);
            }

            stack.extend(node.children.values().rev().copied());
        }
    }

    /// Run `initialize` on the listed components of `node`.
    ///
    /// Used by the attach pass after a decoded subtree has been grafted.
    pub(crate) fn initialize_components(&mut self, node: NodeId, type_names: &[String]) {
        let Some(target) = self.nodes.get_mut(node) else {
            return;
        };
        let mut context = NodeContext {
            node,
            name: &target.name,
            transform: &mut target.transform,
            world_transform: &target.world_transform,
            scene: &mut self.state,
        };
        for type_name in type_names {
            if let Some(component) = target.components.get_mut(type_name) {
                component.initialize(&mut context);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::tests::TestComponent;

    #[test]
    fn test_new_scene_has_root() {
        let scene = Scene::new();
        let root = scene.node(scene.root()).unwrap();

        assert_eq!(root.name(), ROOT_NAME);
        assert!(root.parent().is_none());
        assert_eq!(*root.world_transform(), Mat4::identity());
        assert_eq!(*root.transform().matrix(), Mat4::identity());
        assert_eq!(root.child_count(), 0);
        assert_eq!(root.component_names().count(), 0);
    }

    #[test]
    fn test_new_child_links_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let child = scene.new_child(root, "test").unwrap();

        let node = scene.node(child).unwrap();
        assert_eq!(node.parent(), Some(root));
        assert_eq!(node.name(), "test");
        assert_eq!(scene.child(root, "test"), Some(child));
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.component_names().count(), 0);
    }

    #[test]
    fn test_duplicate_child_fails_without_mutation() {
        let mut scene = Scene::new();
        let root = scene.root();
        let first = scene.new_child(root, "test").unwrap();

        let result = scene.new_child(root, "test");
        assert!(matches!(
            result,
            Err(SceneError::DuplicateChild { ref name, .. }) if name == "test"
        ));
        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.child(root, "test"), Some(first));
        assert_eq!(scene.node(root).unwrap().child_count(), 1);
    }

    #[test]
    fn test_add_component_initializes_once() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.add_component(root, TestComponent::default()).unwrap();

        let component = scene.component_of::<TestComponent>(root).unwrap();
        assert_eq!(component.initialize_called, 1);
        assert_eq!(component.node, Some(root));
        assert!(scene.component(root, "testComponent").is_some());
    }

    #[test]
    fn test_duplicate_component_fails_without_mutation() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene
            .add_component(
                root,
                TestComponent {
                    value: 1,
                    ..Default::default()
                },
            )
            .unwrap();

        let result = scene.add_component(
            root,
            TestComponent {
                value: 2,
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(SceneError::DuplicateComponent { type_name, .. }) if type_name == "testComponent"
        ));

        let component = scene.component_of::<TestComponent>(root).unwrap();
        assert_eq!(component.value, 1);
        assert_eq!(component.initialize_called, 1);
        assert_eq!(scene.node(root).unwrap().component_names().count(), 1);
    }

    #[test]
    fn test_update_computes_world_transforms() {
        let mut scene = Scene::new();
        let root = scene.root();
        let child = scene.new_child(root, "child").unwrap();
        scene
            .node_mut(child)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(1.0, 2.0, 3.0));
        scene.add_component(child, TestComponent::default()).unwrap();

        scene.update_tree();

        assert_eq!(scene.world_transform(root), Some(Mat4::identity()));
        assert_eq!(scene.world_transform(child), Some(utils::translation(1.0, 2.0, 3.0)));
        assert_eq!(scene.component_of::<TestComponent>(child).unwrap().update_called, 1);
    }

    #[test]
    fn test_update_called_once_per_pass_at_every_depth() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.new_child(root, "a").unwrap();
        let b = scene.new_child(a, "b").unwrap();
        let c = scene.new_child(b, "c").unwrap();
        let d = scene.new_child(root, "d").unwrap();
        for id in [root, a, b, c, d] {
            scene.add_component(id, TestComponent::default()).unwrap();
        }

        scene.update_tree();
        scene.update_tree();

        for id in [root, a, b, c, d] {
            assert_eq!(scene.component_of::<TestComponent>(id).unwrap().update_called, 2);
        }
    }

    #[test]
    fn test_world_transform_composes_ancestor_chain() {
        let mut scene = Scene::new();
        let root = scene.root();
        let arm = scene.new_child(root, "arm").unwrap();
        let hand = scene.new_child(arm, "hand").unwrap();

        scene.node_mut(arm).unwrap().transform_mut().set_position(Vec3::new(1.0, 0.0, 0.0));
        scene.node_mut(arm).unwrap().transform_mut().set_scale(Vec3::new(2.0, 2.0, 2.0));
        scene.node_mut(hand).unwrap().transform_mut().set_position(Vec3::new(0.0, 1.0, 0.0));

        scene.update_tree();

        let expected = scene.node(arm).unwrap().transform().matrix()
            * scene.node(hand).unwrap().transform().matrix();
        assert_eq!(scene.world_transform(hand), Some(expected));
        assert_eq!(
            utils::translation_of(&scene.world_transform(hand).unwrap()),
            Vec3::new(1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn test_world_transform_is_recomputed_every_pass() {
        let mut scene = Scene::new();
        let root = scene.root();
        let child = scene.new_child(root, "child").unwrap();
        scene.update_tree();
        assert_eq!(scene.world_transform(child), Some(Mat4::identity()));

        scene.node_mut(child).unwrap().transform_mut().set_position(Vec3::new(0.0, 5.0, 0.0));
        scene.update_tree();
        assert_eq!(scene.world_transform(child), Some(utils::translation(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_root_world_transform_ignores_root_local() {
        let mut scene = Scene::new();
        let root = scene.root();
        let child = scene.new_child(root, "child").unwrap();
        scene.node_mut(root).unwrap().transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        scene
            .node_mut(child)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(1.0, 2.0, 3.0));

        scene.update_tree();

        assert_eq!(scene.world_transform(root), Some(Mat4::identity()));
        assert_eq!(scene.world_transform(child), Some(utils::translation(1.0, 2.0, 3.0)));
        assert_eq!(scene.node(root).unwrap().transform().position(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_render_visits_every_component() {
        let mut scene = Scene::new();
        let root = scene.root();
        let child = scene.new_child(root, "child").unwrap();
        scene.add_component(root, TestComponent::default()).unwrap();
        scene.add_component(child, TestComponent::default()).unwrap();

        let mut backend = RecordingBackend::new();
        scene.update(&mut backend);
        scene.render(&mut backend);

        // TestComponent draws its node name on render
        let drawn: Vec<_> = backend.draws.iter().map(|d| d.mesh.as_str()).collect();
        assert_eq!(drawn, vec![ROOT_NAME, "child"]);
        assert!(backend.view_projections.is_empty());
    }

    #[test]
    fn test_remove_child_releases_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.new_child(root, "a").unwrap();
        let b = scene.new_child(a, "b").unwrap();
        scene.add_component(b, TestComponent::default()).unwrap();

        assert!(scene.remove_child(root, "a").unwrap());
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.node_count(), 1);
        assert!(!scene.remove_child(root, "a").unwrap());

        // name is free again
        scene.new_child(root, "a").unwrap();
    }

    #[test]
    fn test_path_and_find() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.new_child(root, "a").unwrap();
        let b = scene.new_child(a, "b").unwrap();

        assert_eq!(scene.path(root).as_deref(), Some(""));
        assert_eq!(scene.path(b).as_deref(), Some("a/b"));
        assert_eq!(scene.find("a/b"), Some(b));
        assert_eq!(scene.find("/a/"), Some(a));
        assert_eq!(scene.find(""), Some(root));
        assert_eq!(scene.find("a/missing"), None);
    }
}
