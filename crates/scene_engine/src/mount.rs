//! Mount points
//!
//! A document node may name an asset in its `mount` field. Decoding records a
//! [`MountRequest`] for each one; the resource layer takes the table after
//! load and grafts the asset's subtree onto each node through an
//! [`AssetMounter`]. [`PrefabLibrary`] is the mounter for assets stored as
//! scene documents.

use crate::document::NodeDocument;
use crate::error::{SceneError, SceneResult};
use crate::node::NodeId;
use crate::registry::ComponentRegistry;
use crate::scene::Scene;
use std::collections::BTreeMap;
use std::path::Path;

/// A node waiting for an external asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Node receiving the asset
    pub node: NodeId,
    /// Asset name
    pub asset: String,
}

/// Resource layer entry point for filling mount points
pub trait AssetMounter {
    /// Graft the named asset onto `node`
    fn mount(&mut self, scene: &mut Scene, node: NodeId, asset: &str) -> SceneResult<()>;
}

impl Scene {
    /// Mount requests not yet taken
    pub fn pending_mounts(&self) -> &[MountRequest] {
        &self.mounts
    }

    /// Take the mount table; a second call returns only requests recorded since
    pub fn take_mounts(&mut self) -> Vec<MountRequest> {
        std::mem::take(&mut self.mounts)
    }

    /// Hand every pending mount request to `mounter`.
    ///
    /// Requests recorded while mounting (nested mount points inside the
    /// grafted asset) stay pending for the next call. Stops at the first
    /// failure; the failed request and the ones not yet handled are put back
    /// at the front of the table.
    pub fn resolve_mounts(&mut self, mounter: &mut dyn AssetMounter) -> SceneResult<usize> {
        let requests = self.take_mounts();
        let count = requests.len();
        let mut requests = requests.into_iter();
        while let Some(request) = requests.next() {
            log::debug!("Mounting {} onto {:?}", request.asset, request.node);
            if let Err(e) = mounter.mount(self, request.node, &request.asset) {
                log::warn!("Could not mount {} onto {:?}: {}", request.asset, request.node, e);
                let recorded = std::mem::take(&mut self.mounts);
                self.mounts = std::iter::once(request)
                    .chain(requests)
                    .chain(recorded)
                    .collect();
                return Err(e);
            }
            if let Some(node) = self.nodes.get_mut(request.node) {
                node.mount = None;
            }
        }
        if count > 0 {
            log::info!("Resolved {} mount points", count);
        }
        Ok(count)
    }
}

/// Named scene documents grafted onto mount points
#[derive(Debug, Clone, Default)]
pub struct PrefabLibrary {
    registry: ComponentRegistry,
    prefabs: BTreeMap<String, NodeDocument>,
}

impl PrefabLibrary {
    /// Empty library decoding prefabs with `registry`
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            prefabs: BTreeMap::new(),
        }
    }

    /// Add or replace a prefab
    pub fn insert(&mut self, name: impl Into<String>, document: NodeDocument) {
        self.prefabs.insert(name.into(), document);
    }

    /// Load every `*.json` file of `dir` as a prefab named after the file stem
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> SceneResult<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = name.to_string();
            self.insert(name, NodeDocument::from_file(&path)?);
            loaded += 1;
        }
        log::info!("Loaded {} prefabs from {}", loaded, dir.as_ref().display());
        Ok(loaded)
    }

    /// Prefab by name
    pub fn get(&self, name: &str) -> Option<&NodeDocument> {
        self.prefabs.get(name)
    }

    /// Number of prefabs
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

impl AssetMounter for PrefabLibrary {
    /// The mount node keeps its own transform; the prefab's components and
    /// children are grafted onto it.
    fn mount(&mut self, scene: &mut Scene, node: NodeId, asset: &str) -> SceneResult<()> {
        let prefab = self
            .prefabs
            .get(asset)
            .ok_or_else(|| SceneError::UnknownAsset(asset.to_string()))?;
        let document = NodeDocument {
            transform: None,
            ..prefab.clone()
        };
        scene.decode_into(node, &document, &self.registry)
    }
}
