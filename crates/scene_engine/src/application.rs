//! Application trait and lifecycle management

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::error::SceneError;
use crate::input::MouseButton;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the engine loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is created. Load the startup scene here
    /// and make it current.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Collect this frame's window and input events
    ///
    /// The window system is external; headless applications return nothing
    /// or scripted events.
    fn poll_events(&mut self, _engine: &mut Engine) -> Result<Vec<AppEvent>, AppError> {
        Ok(Vec::new())
    }

    /// Handle application events
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        engine.handle_event(event)
    }

    /// Update the application
    ///
    /// Called every frame before queued jobs run and the scene is updated.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Render the application
    ///
    /// Called after the scene update. The default renders the current scene.
    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.render()
    }

    /// Cleanup the application
    ///
    /// Called when the loop ends, whether by request or by frame limit.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Window was resized
    WindowResized {
        /// New window width
        width: u32,
        /// New window height
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse movement since the previous event
    MouseMoved {
        /// Horizontal motion in pixels
        dx: f32,
        /// Vertical motion in pixels
        dy: f32,
    },

    /// Mouse wheel
    MouseWheel {
        /// Vertical scroll delta
        delta: f32,
    },
}
