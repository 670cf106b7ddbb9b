//! Scene viewer
//!
//! Loads the startup scene named in the viewer config, fills its mount points
//! from the prefab directory and runs the frame loop against a logging
//! backend. Mouse input is scripted so the orbit camera moves without a
//! window. A background thread drops a marker model into the scene through
//! the frame queue.
//!
//! Usage: `scene_viewer [config.toml|config.ron]`

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Frames during which the scripted drag is held
const DRAG_FRAMES: u64 = 30;
/// Frames between camera position reports
const REPORT_INTERVAL: u64 = 60;
/// Upper bound on mount resolution passes (nested prefabs)
const MAX_MOUNT_PASSES: usize = 8;

#[derive(Error, Debug)]
enum ViewerError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Scene(#[from] SceneError),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("component registry lock poisoned")]
    RegistryPoisoned,
}

struct ViewerApp {
    config: SceneConfig,
    scene: Option<SharedScene>,
    worker: Option<JoinHandle<()>>,
}

impl ViewerApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            scene: None,
            worker: None,
        }
    }

    fn load_scene(&self) -> Result<Scene, AppError> {
        let registry = ComponentRegistry::global()
            .read()
            .map_err(|_| AppError::Custom("component registry lock poisoned".to_string()))?
            .clone();

        let path = self.config.start_scene_path();
        let mut scene = Scene::load_file(&path, &registry)?;

        let mut library = PrefabLibrary::new(registry);
        if let Some(dir) = self.config.prefab_dir.as_ref().filter(|dir| dir.is_dir()) {
            library.load_dir(dir)?;
        }
        for _ in 0..MAX_MOUNT_PASSES {
            if scene.pending_mounts().is_empty() {
                break;
            }
            scene.resolve_mounts(&mut library)?;
        }
        if !scene.pending_mounts().is_empty() {
            log::warn!(
                "{} mount points still unresolved after {} passes",
                scene.pending_mounts().len(),
                MAX_MOUNT_PASSES
            );
        }
        Ok(scene)
    }

    fn spawn_marker_loader(sender: FrameSender) -> JoinHandle<()> {
        thread::spawn(move || {
            // Stands in for slow asset decoding
            thread::sleep(Duration::from_millis(50));
            let renderer = MeshRenderer::new("marker").with_material("highlight");

            let result = sender.call(move |scene| {
                let root = scene.root();
                match scene.new_child(root, "marker") {
                    Ok(marker) => {
                        if let Err(e) = scene.add_component(marker, renderer) {
                            log::warn!("Could not attach marker renderer: {}", e);
                        }
                    }
                    Err(e) => log::warn!("Could not create marker node: {}", e),
                }
            });
            if let Err(e) = result {
                log::warn!("Marker not delivered: {}", e);
            }
        })
    }
}

impl Application for ViewerApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let scene = self.load_scene()?.into_shared();
        engine.set_scene(&scene)?;
        {
            let scene = scene.borrow();
            log::info!(
                "Scene ready: {} nodes, active camera: {}",
                scene.node_count(),
                scene
                    .state()
                    .active_camera()
                    .and_then(|camera| scene.path(camera))
                    .unwrap_or_else(|| "none".to_string())
            );
        }
        self.scene = Some(scene);

        self.worker = Some(Self::spawn_marker_loader(engine.frame_sender()));
        Ok(())
    }

    fn poll_events(&mut self, engine: &mut Engine) -> Result<Vec<AppEvent>, AppError> {
        let frame = engine.frame_count();
        let events = match frame {
            1 => vec![AppEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            }],
            f if f < DRAG_FRAMES => vec![AppEvent::MouseMoved { dx: 4.0, dy: 1.0 }],
            f if f == DRAG_FRAMES => vec![
                AppEvent::MouseButton {
                    button: MouseButton::Left,
                    pressed: false,
                },
                AppEvent::MouseWheel { delta: 1.0 },
            ],
            _ => Vec::new(),
        };
        Ok(events)
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(worker) = self.worker.take() {
                worker
                    .join()
                    .map_err(|_| AppError::Custom("marker loader panicked".to_string()))?;
            }
        }

        if engine.frame_count() % REPORT_INTERVAL == 0 {
            if let Some(scene) = &self.scene {
                if let Some((_, eye)) = scene.borrow().view_projection() {
                    log::info!(
                        "Frame {}: camera at ({:.2}, {:.2}, {:.2})",
                        engine.frame_count(),
                        eye.x,
                        eye.y,
                        eye.z
                    );
                }
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Marker loader panicked");
            }
        }
        if let Some(scene) = self.scene.take() {
            match scene.borrow().node_to_string(scene.borrow().root()) {
                Ok(json) => log::debug!("Final scene: {}", json),
                Err(e) => log::warn!("Could not encode final scene: {}", e),
            }
        }
        clear_current();
    }
}

fn run() -> Result<(), ViewerError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load_from_file(path)?,
        None => ViewerConfig::default(),
    };
    logging::init_with_level(&config.engine.log_level);
    config.validate()?;

    {
        let mut registry = ComponentRegistry::global()
            .write()
            .map_err(|_| ViewerError::RegistryPoisoned)?;
        scene_engine::components::register_builtins(&mut registry)?;
    }

    let mut app = ViewerApp::new(config.scene.clone());
    Engine::run(config.engine, Box::new(LogBackend::new()), &mut app)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("scene_viewer: {}", e);
        std::process::exit(1);
    }
}
