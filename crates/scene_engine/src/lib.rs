//! # Scene Engine
//!
//! A hierarchical scene graph with pluggable components for a small real-time
//! 3D engine.
//!
//! ## Features
//!
//! - **Scene Graph**: named nodes with local transforms, composed into world
//!   transforms once per frame
//! - **Components**: trait-object behaviors with initialize/update/render hooks
//! - **Documents**: JSON scene files decoded through a component registry
//! - **Mount Points**: nodes filled with prefab subtrees after load
//! - **Frame Queue**: background threads hand work to the traversal thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct Viewer;
//!
//! impl Application for Viewer {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let registry = ComponentRegistry::with_builtins()?;
//!         let scene = Scene::load_file("assets/scenes/main.json", &registry)?;
//!         engine.set_scene(&scene.into_shared())?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_max_frames(60);
//!     Engine::run(config, Box::new(LogBackend::new()), &mut Viewer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod backend;
pub mod component;
pub mod components;
pub mod config;
pub mod current;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod foundation;
pub mod input;
pub mod mount;
pub mod node;
pub mod registry;
pub mod scene;
pub mod transform;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        backend::{DrawCall, LogBackend, RecordingBackend, RenderBackend},
        component::{Component, NodeContext, RenderContext},
        components::{Camera, MeshRenderer, OrbitCamera},
        config::{Config, ConfigError, EngineConfig, SceneConfig, ViewerConfig},
        current::{clear_current, current, make_current, SharedScene},
        dispatch::{FrameQueue, FrameSender},
        document::NodeDocument,
        error::{SceneError, SceneResult},
        foundation::math::{Mat4, Quat, Vec3},
        input::{FrameInput, MouseButton, Viewport},
        mount::{AssetMounter, MountRequest, PrefabLibrary},
        node::{Node, NodeId},
        registry::ComponentRegistry,
        scene::{Scene, SceneState},
        transform::Transform,
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
