//! Rendering backend contract
//!
//! The scene graph never talks to a graphics API directly. `Scene::update`
//! hands the active camera's view/projection to the backend and components
//! issue draw calls from `render`. Native implementations live outside this
//! crate; [`LogBackend`] and [`RecordingBackend`] cover headless runs and tests.

use crate::foundation::math::{Mat4, Vec3};

/// A single mesh draw request
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Mesh asset name
    pub mesh: String,
    /// Material name, if any
    pub material: Option<String>,
    /// Model (world) matrix of the drawing node
    pub model: Mat4,
}

/// Entry points the scene graph calls on the rendering backend
pub trait RenderBackend {
    /// Set the active view/projection and the eye position for the frame
    fn set_view_projection(&mut self, view_projection: &Mat4, eye: &Vec3);

    /// Draw a mesh with the given model matrix
    fn draw_mesh(&mut self, call: &DrawCall);
}

/// Backend that only logs what it is asked to do
#[derive(Debug, Default)]
pub struct LogBackend {
    draws_this_frame: usize,
}

impl LogBackend {
    /// Create a new logging backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of draw calls since the last view/projection change
    pub fn draws_this_frame(&self) -> usize {
        self.draws_this_frame
    }
}

impl RenderBackend for LogBackend {
    fn set_view_projection(&mut self, _view_projection: &Mat4, eye: &Vec3) {
        log::trace!("View/projection set, eye at ({:.3}, {:.3}, {:.3})", eye.x, eye.y, eye.z);
        self.draws_this_frame = 0;
    }

    fn draw_mesh(&mut self, call: &DrawCall) {
        log::trace!("Draw mesh '{}' (material: {:?})", call.mesh, call.material);
        self.draws_this_frame += 1;
    }
}

/// Backend that records every call, for tests and tooling
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Every view/projection handed over, in order
    pub view_projections: Vec<(Mat4, Vec3)>,
    /// Every draw call, in order
    pub draws: Vec<DrawCall>,
}

impl RecordingBackend {
    /// Create an empty recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.view_projections.clear();
        self.draws.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn set_view_projection(&mut self, view_projection: &Mat4, eye: &Vec3) {
        self.view_projections.push((*view_projection, *eye));
    }

    fn draw_mesh(&mut self, call: &DrawCall) {
        self.draws.push(call.clone());
    }
}
