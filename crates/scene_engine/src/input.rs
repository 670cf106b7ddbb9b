//! Per-frame input snapshot
//!
//! The window/input subsystem is external. The outer loop fills a
//! [`FrameInput`] before each update; components read it through
//! [`SceneState`](crate::scene::SceneState).

/// Mouse buttons tracked by the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button (button 0)
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
        }
    }
}

/// Input state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    buttons: [bool; 3],
    mouse_delta: (f32, f32),
    scroll: f32,
}

impl FrameInput {
    /// Empty snapshot: no buttons held, no motion
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a mouse button is held
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    /// Whether a mouse button is held
    pub fn button(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    /// Accumulate mouse motion (pixels) for this frame
    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Mouse motion since the previous frame
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Accumulate vertical scroll for this frame
    pub fn add_scroll(&mut self, amount: f32) {
        self.scroll += amount;
    }

    /// Vertical scroll since the previous frame
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Reset per-frame motion; held buttons persist
    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll = 0.0;
    }
}

/// Drawable area size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a degenerate viewport
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_resets_but_buttons_persist() {
        let mut input = FrameInput::new();
        input.set_button(MouseButton::Left, true);
        input.add_mouse_motion(3.0, -2.0);
        input.add_mouse_motion(1.0, 1.0);
        input.add_scroll(1.5);

        assert_eq!(input.mouse_delta(), (4.0, -1.0));
        assert_eq!(input.scroll(), 1.5);

        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
        assert_eq!(input.scroll(), 0.0);
        assert!(input.button(MouseButton::Left));
        assert!(!input.button(MouseButton::Right));
    }

    #[test]
    fn degenerate_viewport_has_unit_aspect() {
        assert_eq!(Viewport::new(800, 0).aspect(), 1.0);
        assert_eq!(Viewport::new(0, 600).aspect(), 1.0);
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
    }
}
