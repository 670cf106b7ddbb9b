//! Core engine implementation
//!
//! The engine owns the rendering backend and the frame queue and runs the
//! frame loop against the current scene:
//!
//! 1. poll and handle events (input lands in the scene's frame input)
//! 2. application update
//! 3. drain queued background jobs
//! 4. scene update (camera handoff, then traversal)
//! 5. render
//! 6. reset per-frame input

use crate::application::{AppError, AppEvent, Application};
use crate::backend::RenderBackend;
use crate::config::{ConfigError, EngineConfig};
use crate::current::{self, SharedScene};
use crate::dispatch::{FrameQueue, FrameSender};
use crate::error::SceneError;
use crate::foundation::time::Timer;
use crate::input::Viewport;
use crate::scene::Scene;
use thiserror::Error;

/// Main engine struct
///
/// The engine coordinates the backend, the frame queue and the current scene.
pub struct Engine {
    backend: Box<dyn RenderBackend>,
    queue: FrameQueue,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        Ok(Self {
            backend,
            queue: FrameQueue::new(config.queue_capacity),
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application>(
        config: EngineConfig,
        backend: Box<dyn RenderBackend>,
        app: &mut T,
    ) -> Result<(), EngineError> {
        let mut engine = Self::new(config, backend)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");

        while engine.running {
            if let Err(e) = engine.frame(app) {
                app.cleanup(&mut engine);
                return Err(e);
            }
        }

        app.cleanup(&mut engine);

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} fps average)",
            engine.timer.frame_count(),
            engine.timer.average_fps()
        );
        Ok(())
    }

    /// Run a single frame
    fn frame<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        self.timer.tick();
        let delta_time = self.timer.delta_time();

        let events = app
            .poll_events(self)
            .map_err(|e| EngineError::ApplicationError(format!("App events: {}", e)))?;
        for event in events {
            app.handle_event(self, event)
                .map_err(|e| EngineError::ApplicationError(format!("App event: {}", e)))?;
        }

        app.update(self, delta_time)
            .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

        self.update()?;

        app.render(self)
            .map_err(|e| EngineError::ApplicationError(format!("App render: {}", e)))?;

        self.end_frame()?;

        if let Some(max_frames) = self.config.max_frames {
            if self.timer.frame_count() >= max_frames {
                log::info!("Frame limit of {} reached", max_frames);
                self.running = false;
            }
        }
        Ok(())
    }

    /// Drain queued jobs, then update the current scene
    fn update(&mut self) -> Result<(), EngineError> {
        let Some(scene) = current::current() else {
            log::trace!("No current scene to update");
            return Ok(());
        };
        let mut scene = scene.try_borrow_mut().map_err(|_| EngineError::SceneBusy)?;

        self.queue.drain(&mut *scene, self.config.max_jobs_per_frame);
        scene.update(self.backend.as_mut());
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), EngineError> {
        self.with_scene(|scene| scene.state_mut().input_mut().end_frame())?;
        Ok(())
    }

    /// Render the current scene
    pub fn render(&mut self) -> Result<(), AppError> {
        let Some(scene) = current::current() else {
            return Ok(());
        };
        let scene = scene.try_borrow().map_err(|_| EngineError::SceneBusy)?;
        scene.render(self.backend.as_mut());
        Ok(())
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::WindowCloseRequested => {
                self.quit();
            }
            AppEvent::WindowResized { width, height } => {
                let viewport = Viewport::new(width, height);
                self.config.viewport = viewport;
                self.with_scene(|scene| scene.state_mut().set_viewport(viewport))?;
            }
            AppEvent::MouseButton { button, pressed } => {
                self.with_scene(|scene| scene.state_mut().input_mut().set_button(button, pressed))?;
            }
            AppEvent::MouseMoved { dx, dy } => {
                self.with_scene(|scene| scene.state_mut().input_mut().add_mouse_motion(dx, dy))?;
            }
            AppEvent::MouseWheel { delta } => {
                self.with_scene(|scene| scene.state_mut().input_mut().add_scroll(delta))?;
            }
        }

        Ok(())
    }

    /// Make `scene` current and hand it the engine's viewport
    pub fn set_scene(&mut self, scene: &SharedScene) -> Result<(), EngineError> {
        scene
            .try_borrow_mut()
            .map_err(|_| EngineError::SceneBusy)?
            .state_mut()
            .set_viewport(self.config.viewport);
        current::make_current(scene);
        Ok(())
    }

    /// Run `f` on the current scene; `None` when no scene is current
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> Result<Option<R>, EngineError> {
        let Some(scene) = current::current() else {
            return Ok(None);
        };
        let mut scene = scene.try_borrow_mut().map_err(|_| EngineError::SceneBusy)?;
        Ok(Some(f(&mut *scene)))
    }

    /// Producer handle for posting work from other threads
    pub fn frame_sender(&self) -> FrameSender {
        self.queue.sender()
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop keeps running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get mutable access to the rendering backend
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Frames started so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// The current scene is borrowed elsewhere
    #[error("Current scene is already borrowed")]
    SceneBusy,

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LogBackend;
    use crate::components::{Camera, MeshRenderer};
    use crate::input::MouseButton;
    use crate::tests::TestComponent;
    use std::thread;

    /// Scripted app: builds a scene, posts a job from another thread, counts frames
    #[derive(Default)]
    struct ScriptedApp {
        scene: Option<SharedScene>,
        updates: u32,
        cleaned_up: bool,
        worker: Option<thread::JoinHandle<()>>,
    }

    impl Application for ScriptedApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let mut scene = Scene::new();
            let root = scene.root();
            let camera = scene.new_child(root, "camera")?;
            scene.add_component(camera, Camera::default())?;
            scene.add_component(root, TestComponent::default())?;
            let scene = scene.into_shared();
            engine.set_scene(&scene)?;
            self.scene = Some(scene);

            let sender = engine.frame_sender();
            self.worker = Some(thread::spawn(move || {
                let renderer = MeshRenderer::new("late");
                sender
                    .call(move |scene| {
                        let root = scene.root();
                        let late = scene.new_child(root, "late").unwrap();
                        scene.add_component(late, renderer).unwrap();
                    })
                    .ok();
            }));
            Ok(())
        }

        fn poll_events(&mut self, engine: &mut Engine) -> Result<Vec<AppEvent>, AppError> {
            if engine.frame_count() == 1 {
                Ok(vec![
                    AppEvent::WindowResized { width: 640, height: 480 },
                    AppEvent::MouseButton { button: MouseButton::Left, pressed: true },
                    AppEvent::MouseMoved { dx: 4.0, dy: 2.0 },
                ])
            } else {
                Ok(Vec::new())
            }
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            if self.updates == 0 {
                if let Some(worker) = self.worker.take() {
                    worker.join().map_err(|_| AppError::Custom("worker panicked".to_string()))?;
                }
            }
            self.updates += 1;
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let mut app = ScriptedApp::default();
        let config = EngineConfig::new().with_max_frames(3);
        Engine::run(config, Box::new(LogBackend::new()), &mut app).unwrap();

        assert_eq!(app.updates, 3);
        assert!(app.cleaned_up);

        let scene = app.scene.take().unwrap();
        let scene = scene.borrow();
        let root = scene.root();
        assert_eq!(scene.component_of::<TestComponent>(root).unwrap().update_called, 3);
        assert_eq!(scene.state().viewport(), Viewport::new(640, 480));
        assert!(scene.state().input().button(MouseButton::Left));
        assert_eq!(scene.state().input().mouse_delta(), (0.0, 0.0));

        let late = scene.find("late").unwrap();
        assert_eq!(scene.component_of::<MeshRenderer>(late).unwrap().mesh, "late");
        current::clear_current();
    }

    #[test]
    fn test_close_request_stops_loop() {
        struct ClosingApp;

        impl Application for ClosingApp {
            fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn poll_events(&mut self, _engine: &mut Engine) -> Result<Vec<AppEvent>, AppError> {
                Ok(vec![AppEvent::WindowCloseRequested])
            }

            fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
                Ok(())
            }

            fn cleanup(&mut self, engine: &mut Engine) {
                assert_eq!(engine.frame_count(), 1);
            }
        }

        Engine::run(EngineConfig::new(), Box::new(LogBackend::new()), &mut ClosingApp).unwrap();
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::new().with_queue(0, 0);
        let result = Engine::new(config, Box::new(LogBackend::new()));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_update_error_aborts_run() {
        struct FailingApp {
            cleaned_up: bool,
        }

        impl Application for FailingApp {
            fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
                Err(AppError::Custom("boom".to_string()))
            }

            fn cleanup(&mut self, _engine: &mut Engine) {
                self.cleaned_up = true;
            }
        }

        let mut app = FailingApp { cleaned_up: false };
        let result = Engine::run(EngineConfig::new(), Box::new(LogBackend::new()), &mut app);
        assert!(matches!(result, Err(EngineError::ApplicationError(_))));
        assert!(app.cleaned_up);
    }
}
