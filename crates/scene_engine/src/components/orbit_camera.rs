//! Mouse-driven orbit rig
//!
//! Dragging with the left button spins the rig around the origin and the
//! scroll wheel zooms. Motion keeps some momentum and decays each frame.

use crate::component::{Component, NodeContext};
use crate::foundation::math::{constants, Point3, Vec3};
use crate::input::MouseButton;
use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

const DAMPING: f32 = 0.90;
const MOUSE_SENSITIVITY: f32 = 0.005;
const ACCELERATION: f32 = 0.1;
const ZOOM_SENSITIVITY: f32 = 0.005;
const PITCH_LIMIT: f32 = constants::HALF_PI - 0.001;
const MIN_DISTANCE: f32 = 0.01;

/// Orbit rig that places its node on a sphere around the origin, facing it
/// down the node's local -Z axis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    /// Pitch in radians
    pub rot_x: f32,
    /// Yaw in radians
    pub rot_y: f32,
    /// Distance from the origin
    pub dist: f32,
    #[serde(skip)]
    rot_x_velocity: f32,
    #[serde(skip)]
    rot_y_velocity: f32,
    #[serde(skip)]
    zoom_velocity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            rot_x: 0.0,
            rot_y: 0.0,
            dist: 10.0,
            rot_x_velocity: 0.0,
            rot_y_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }
}

impl OrbitCamera {
    /// Rig at the given distance, looking down the -Z axis
    pub fn at_distance(dist: f32) -> Self {
        Self {
            dist,
            ..Self::default()
        }
    }

    /// Eye position for the current pitch, yaw and distance
    pub fn eye(&self) -> Vec3 {
        let (sin_x, cos_x) = self.rot_x.sin_cos();
        let (sin_y, cos_y) = self.rot_y.sin_cos();
        Vec3::new(
            self.dist * sin_y * -cos_x,
            self.dist * sin_x,
            self.dist * -cos_y * -cos_x,
        )
    }

    /// Current angular velocity as `(pitch, yaw)`
    pub fn velocity(&self) -> (f32, f32) {
        (self.rot_x_velocity, self.rot_y_velocity)
    }

    fn accelerate(velocity: f32, movement: f32) -> f32 {
        if movement * movement < velocity * velocity {
            velocity * DAMPING
        } else if movement != velocity {
            velocity + ACCELERATION * movement
        } else {
            velocity
        }
    }

    fn apply_pose(&self, node: &mut NodeContext<'_>) {
        let view = Isometry3::look_at_rh(&Point3::from(self.eye()), &Point3::origin(), &Vec3::y());
        node.transform_mut().set_matrix(view.inverse().to_homogeneous());
    }
}

impl Component for OrbitCamera {
    fn type_name(&self) -> &'static str {
        "OrbitCamera"
    }

    fn initialize(&mut self, node: &mut NodeContext<'_>) {
        self.dist = self.dist.max(MIN_DISTANCE);
        self.rot_x = self.rot_x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.apply_pose(node);
    }

    fn update(&mut self, node: &mut NodeContext<'_>) {
        let input = *node.scene().input();

        if input.button(MouseButton::Left) {
            let (dx, dy) = input.mouse_delta();
            self.rot_y_velocity = Self::accelerate(self.rot_y_velocity, dx * MOUSE_SENSITIVITY);
            self.rot_x_velocity = Self::accelerate(self.rot_x_velocity, dy * MOUSE_SENSITIVITY);
        } else {
            self.rot_y_velocity *= DAMPING;
            self.rot_x_velocity *= DAMPING;
        }
        self.rot_x = (self.rot_x + self.rot_x_velocity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.rot_y += self.rot_y_velocity;

        let scroll = input.scroll();
        if scroll == 0.0 {
            self.zoom_velocity *= DAMPING;
        } else {
            self.zoom_velocity += scroll * self.dist * ZOOM_SENSITIVITY;
        }
        self.dist = (self.dist - self.zoom_velocity).max(MIN_DISTANCE);

        self.apply_pose(node);
    }
}
