//! Engine, scene and viewer settings

use super::{Config, ConfigError};
use crate::dispatch;
use crate::input::Viewport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// # Engine Configuration
///
/// Frame loop behavior: logging, the drawable area handed to cameras, and
/// how much queued background work runs per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Initial viewport
    pub viewport: Viewport,
    /// Stop after this many frames; runs until asked to quit when unset
    pub max_frames: Option<u64>,
    /// Frame queue capacity
    pub queue_capacity: usize,
    /// Jobs drained from the frame queue per frame
    pub max_jobs_per_frame: usize,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            viewport: Viewport::default(),
            max_frames: None,
            queue_capacity: dispatch::DEFAULT_CAPACITY,
            max_jobs_per_frame: 1,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the initial viewport
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Stop after `frames` frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set frame queue capacity and per-frame drain limit
    pub fn with_queue(mut self, capacity: usize, jobs_per_frame: usize) -> Self {
        self.queue_capacity = capacity;
        self.max_jobs_per_frame = jobs_per_frame;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "off" | "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(ConfigError::Invalid(format!("Unknown log level: {}", self.log_level)));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("Viewport must not be empty".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("Queue capacity must be at least 1".to_string()));
        }
        if self.max_jobs_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "At least one queued job must run per frame".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

/// # Scene Configuration
///
/// Where scene documents and prefabs live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory holding scene documents
    pub scene_dir: PathBuf,
    /// Scene loaded at startup, relative to `scene_dir`
    pub start_scene: String,
    /// Directory of prefab documents used to fill mount points
    pub prefab_dir: Option<PathBuf>,
}

impl SceneConfig {
    /// Create a new scene configuration
    pub fn new() -> Self {
        Self {
            scene_dir: PathBuf::from("assets/scenes"),
            start_scene: "main.json".to_string(),
            prefab_dir: Some(PathBuf::from("assets/prefabs")),
        }
    }

    /// Set the scene directory
    pub fn with_scene_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scene_dir = dir.into();
        self
    }

    /// Set the startup scene
    pub fn with_start_scene(mut self, scene: impl Into<String>) -> Self {
        self.start_scene = scene.into();
        self
    }

    /// Set or clear the prefab directory
    pub fn with_prefab_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.prefab_dir = dir;
        self
    }

    /// Full path of the startup scene
    pub fn start_scene_path(&self) -> PathBuf {
        self.scene_dir.join(&self.start_scene)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_scene.is_empty() {
            return Err(ConfigError::Invalid("Start scene cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for SceneConfig {}

/// # Viewer Configuration
///
/// Top-level configuration of the scene viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Engine configuration
    pub engine: EngineConfig,
    /// Scene configuration
    pub scene: SceneConfig,
}

impl ViewerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.scene.validate()?;
        Ok(())
    }
}

impl Config for ViewerConfig {}
