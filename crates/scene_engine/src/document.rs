//! Scene documents
//!
//! A document is the JSON form of a node subtree:
//!
//! ```json
//! {
//!   "transform": { "position": [0, 0, 0], "rotation": [1, 0, 0, 0], "scale": [1, 1, 1] },
//!   "children": { "<name>": { ... } },
//!   "components": { "<type name>": { ... } },
//!   "mount": "<asset name>"
//! }
//! ```
//!
//! Decoding is two-phase. The whole document is first turned into a detached
//! tree of constructed components, which is where every error surfaces. Only
//! a fully valid tree is grafted into the scene, after which `initialize`
//! runs on the new components, parents before children.

use crate::component::Component;
use crate::error::{SceneError, SceneResult};
use crate::mount::MountRequest;
use crate::node::NodeId;
use crate::registry::ComponentRegistry;
use crate::scene::Scene;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Serialized form of a node subtree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Local transform; an absent transform leaves the target's unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Children by name
    #[serde(default)]
    pub children: BTreeMap<String, NodeDocument>,
    /// Component payloads by type name
    #[serde(default)]
    pub components: BTreeMap<String, serde_json::Value>,
    /// Asset to graft into this node once loading completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
}

impl NodeDocument {
    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a document file
    pub fn from_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Compact JSON text
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON text
    pub fn to_json_pretty(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for NodeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Fully validated subtree, not yet attached to a scene
struct DecodedNode {
    transform: Option<Transform>,
    children: Vec<(String, DecodedNode)>,
    components: Vec<(String, Box<dyn Component>)>,
    mount: Option<String>,
}

impl DecodedNode {
    fn decode(document: &NodeDocument, registry: &ComponentRegistry) -> SceneResult<Self> {
        let mut components = Vec::with_capacity(document.components.len());
        for (type_name, payload) in &document.components {
            let mut component = registry.construct(type_name)?;
            component
                .decode_payload(payload.clone())
                .map_err(|source| SceneError::ComponentPayload {
                    type_name: type_name.clone(),
                    source,
                })?;
            components.push((type_name.clone(), component));
        }

        let children = document
            .children
            .iter()
            .map(|(name, child)| Ok((name.clone(), Self::decode(child, registry)?)))
            .collect::<SceneResult<Vec<_>>>()?;

        Ok(Self {
            transform: document.transform.clone(),
            children,
            components,
            mount: document.mount.clone(),
        })
    }
}

/// Components attached by a graft, awaiting `initialize`
type PendingInit = Vec<(NodeId, Vec<String>)>;

impl Scene {
    /// Build a new scene from a document.
    ///
    /// The document describes the root node. Fails without producing a scene
    /// if any component type is unregistered or any payload is malformed.
    pub fn load(document: &NodeDocument, registry: &ComponentRegistry) -> SceneResult<Self> {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.decode_into(root, document, registry)?;
        log::info!("Loaded scene with {} nodes", scene.node_count());
        Ok(scene)
    }

    /// Build a new scene from JSON text
    pub fn load_str(json: &str, registry: &ComponentRegistry) -> SceneResult<Self> {
        Self::load(&NodeDocument::from_json(json)?, registry)
    }

    /// Build a new scene from a JSON file
    pub fn load_file(path: impl AsRef<Path>, registry: &ComponentRegistry) -> SceneResult<Self> {
        let path = path.as_ref();
        log::info!("Loading scene from {}", path.display());
        Self::load(&NodeDocument::from_file(path)?, registry)
    }

    /// Decode a document into an existing node.
    ///
    /// The document's transform (if present) replaces the node's, its
    /// components are attached and its children are created below the node.
    /// Every check runs before the first mutation, so on error the scene is
    /// unchanged and no `initialize` has been called.
    pub fn decode_into(
        &mut self,
        target: NodeId,
        document: &NodeDocument,
        registry: &ComponentRegistry,
    ) -> SceneResult<()> {
        let decoded = DecodedNode::decode(document, registry)?;
        self.check_graft(target, &decoded)?;

        let mut pending = PendingInit::new();
        self.graft(target, decoded, &mut pending);
        for (node, type_names) in pending {
            self.initialize_components(node, &type_names);
        }
        Ok(())
    }

    fn check_graft(&self, target: NodeId, decoded: &DecodedNode) -> SceneResult<()> {
        let node = self.nodes.get(target).ok_or(SceneError::NodeNotFound)?;
        if let Some((type_name, _)) = decoded
            .components
            .iter()
            .find(|(type_name, _)| node.has_component(type_name))
        {
            return Err(SceneError::DuplicateComponent {
                node: node.name.clone(),
                type_name: type_name.clone(),
            });
        }
        if let Some((name, _)) = decoded
            .children
            .iter()
            .find(|(name, _)| node.children.contains_key(name))
        {
            return Err(SceneError::DuplicateChild {
                parent: node.name.clone(),
                name: name.clone(),
            });
        }
        Ok(())
    }

    fn graft(&mut self, target: NodeId, decoded: DecodedNode, pending: &mut PendingInit) {
        let DecodedNode {
            transform,
            children,
            components,
            mount,
        } = decoded;

        let Some(node) = self.nodes.get_mut(target) else {
            return;
        };
        if let Some(transform) = transform {
            node.transform = transform;
        }
        if let Some(asset) = mount {
            node.mount = Some(asset.clone());
            self.mounts.push(MountRequest { node: target, asset });
        }

        let type_names = components.iter().map(|(name, _)| name.clone()).collect();
        let Some(node) = self.nodes.get_mut(target) else {
            return;
        };
        node.components.extend(components);
        pending.push((target, type_names));

        for (name, child) in children {
            // Names are unique: checked above for the target, fresh nodes have no children
            if let Ok(child_id) = self.new_child(target, &name) {
                self.graft(child_id, child, pending);
            }
        }
    }

    /// Encode a node and its subtree
    pub fn encode(&self, node: NodeId) -> SceneResult<NodeDocument> {
        let source = self.nodes.get(node).ok_or(SceneError::NodeNotFound)?;

        let mut components = BTreeMap::new();
        for (type_name, component) in &source.components {
            let payload =
                component
                    .encode_payload()
                    .map_err(|source| SceneError::ComponentPayload {
                        type_name: type_name.clone(),
                        source,
                    })?;
            components.insert(type_name.clone(), payload);
        }

        let children = source
            .children
            .iter()
            .map(|(name, child)| Ok((name.clone(), self.encode(*child)?)))
            .collect::<SceneResult<BTreeMap<_, _>>>()?;

        Ok(NodeDocument {
            transform: Some(source.transform.clone()),
            children,
            components,
            mount: source.mount.clone(),
        })
    }

    /// Compact JSON text of a node and its subtree
    pub fn node_to_string(&self, node: NodeId) -> SceneResult<String> {
        self.encode(node)?.to_json()
    }

    /// Write the whole scene to a JSON file
    pub fn save_file(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        let json = self.encode(self.root)?.to_json_pretty()?;
        std::fs::write(path, json)?;
        log::info!("Saved scene to {}", path.display());
        Ok(())
    }
}
