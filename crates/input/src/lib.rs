//! Input handling for keyboard, mouse, and scroll wheel.

mod bindings;

pub use bindings::*;

use glam::Vec2;
use std::collections::HashSet;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,

    /// Mouse position in window coordinates.
    mouse_position: Vec2,

    /// Scroll delta in pixels this frame (positive = wheel scrolled down).
    scroll_delta: f32,
    /// Scroll accumulated since the last frame.
    accumulated_scroll: f32,

    /// Whether the cursor has left the window.
    cursor_outside: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the wheel movement gathered since the previous call.
    ///
    /// Call once per frame after all window events have been pumped and
    /// before the frame is sampled (`Session::frame`). Wheel events that
    /// arrive later are held for the next frame.
    pub fn begin_frame(&mut self) {
        self.scroll_delta = self.accumulated_scroll;
        self.accumulated_scroll = 0.0;
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.mouse_position = Vec2::new(position.0 as f32, position.1 as f32);
        self.cursor_outside = false;
    }

    /// The cursor left the window; cursor-driven effects should stop.
    pub fn process_cursor_left(&mut self) {
        self.cursor_outside = true;
    }

    /// Process a wheel event.
    pub fn process_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.accumulated_scroll += match delta {
            // One notch is roughly 100 px in browsers; keep that scale.
            MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
            MouseScrollDelta::PixelDelta(position) => -position.y as f32,
        };
    }

    // Query methods

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a mouse button is held.
    pub fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Get the mouse position in window coordinates, or `None` while the
    /// cursor is outside the window.
    pub fn cursor_position(&self) -> Option<Vec2> {
        (!self.cursor_outside).then_some(self.mouse_position)
    }

    /// Scroll delta latched for this frame.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta};
pub use winit::keyboard::KeyCode;
