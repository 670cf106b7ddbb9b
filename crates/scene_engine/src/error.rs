//! Error types for the scene graph and its document format

use thiserror::Error;

/// Result alias used throughout the scene graph
pub type SceneResult<T> = Result<T, SceneError>;

/// Scene graph errors
///
/// Every variant except `Io` and `Document` is a structural contract
/// violation: the operation is aborted and the scene is left unchanged.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A child with this name already exists under the parent
    #[error("child already exists: {name} (parent: {parent})")]
    DuplicateChild {
        /// Name of the parent node
        parent: String,
        /// Rejected child name
        name: String,
    },

    /// A component of this type is already attached to the node
    #[error("component already exists: {type_name} (node: {node})")]
    DuplicateComponent {
        /// Name of the node
        node: String,
        /// Rejected component type name
        type_name: String,
    },

    /// A document referenced a component type that was never registered
    #[error("invalid component type: {0}")]
    UnknownComponentType(String),

    /// A component type name was registered twice
    #[error("component type already registered: {0}")]
    DuplicateRegistration(String),

    /// A constructor produced a component reporting a different type name
    #[error("constructor registered as {registered} builds components named {actual}")]
    RegistryNameMismatch {
        /// Name used at registration
        registered: String,
        /// Name reported by the constructed component
        actual: String,
    },

    /// A node id does not refer to a node of this scene
    #[error("node not found")]
    NodeNotFound,

    /// A mount point referenced an asset the resource layer does not know
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    /// A component payload could not be encoded or decoded
    #[error("component {type_name}: {source}")]
    ComponentPayload {
        /// Component type name
        type_name: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Malformed document syntax
    #[error("could not parse scene document: {0}")]
    Document(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
