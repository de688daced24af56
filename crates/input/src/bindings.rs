//! Key bindings and the sampled per-frame control intent.

use crate::{InputState, KeyCode, MouseButton};
use glam::Vec2;
use std::collections::HashMap;

/// Something the pilot can ask the craft to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ThrustForward,
    ThrustBackward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    Brake,
    Boost,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
    Fire,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::ThrustForward,
        Action::ThrustBackward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Ascend,
        Action::Descend,
        Action::Brake,
        Action::Boost,
        Action::PitchUp,
        Action::PitchDown,
        Action::YawLeft,
        Action::YawRight,
        Action::RollLeft,
        Action::RollRight,
        Action::Fire,
    ];
}

/// A physical input that can trigger an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// Maps actions to the inputs that trigger them.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<Binding>>,
}

impl Default for KeyBindings {
    /// W/X thrust, S brake, A/D strafe, Space/Ctrl vertical, Shift boost,
    /// arrows pitch and yaw, Q/E roll, Enter or left click fires.
    fn default() -> Self {
        use Binding::{Key, Mouse};
        let mut bindings = Self::empty();
        bindings.bind(Action::ThrustForward, Key(KeyCode::KeyW));
        bindings.bind(Action::ThrustBackward, Key(KeyCode::KeyX));
        bindings.bind(Action::Brake, Key(KeyCode::KeyS));
        bindings.bind(Action::StrafeLeft, Key(KeyCode::KeyA));
        bindings.bind(Action::StrafeRight, Key(KeyCode::KeyD));
        bindings.bind(Action::Ascend, Key(KeyCode::Space));
        bindings.bind(Action::Descend, Key(KeyCode::ControlLeft));
        bindings.bind(Action::Boost, Key(KeyCode::ShiftLeft));
        bindings.bind(Action::PitchUp, Key(KeyCode::ArrowUp));
        bindings.bind(Action::PitchDown, Key(KeyCode::ArrowDown));
        bindings.bind(Action::YawLeft, Key(KeyCode::ArrowLeft));
        bindings.bind(Action::YawRight, Key(KeyCode::ArrowRight));
        bindings.bind(Action::RollLeft, Key(KeyCode::KeyQ));
        bindings.bind(Action::RollRight, Key(KeyCode::KeyE));
        bindings.bind(Action::Fire, Key(KeyCode::Enter));
        bindings.bind(Action::Fire, Mouse(MouseButton::Left));
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Add a binding; an action may have several.
    pub fn bind(&mut self, action: Action, binding: Binding) {
        let entry = self.map.entry(action).or_default();
        if !entry.contains(&binding) {
            entry.push(binding);
        }
    }

    /// Remove every binding for an action.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn bindings(&self, action: Action) -> &[Binding] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any binding of `action` is held.
    pub fn is_active(&self, input: &InputState, action: Action) -> bool {
        self.bindings(action).iter().any(|binding| match *binding {
            Binding::Key(key) => input.is_key_held(key),
            Binding::Mouse(button) => input.is_mouse_held(button),
        })
    }
}

/// Sampled control state for one frame. Held state only; edges are derived
/// by the consumer from timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlIntent {
    active: u32,
    /// Cursor position in window pixels, if inside the window.
    pub cursor: Option<Vec2>,
    /// Wheel delta in pixels this frame.
    pub scroll: f32,
}

impl ControlIntent {
    /// Sample the current input through the bindings.
    pub fn sample(input: &InputState, bindings: &KeyBindings) -> Self {
        let mut intent = Self {
            active: 0,
            cursor: input.cursor_position(),
            scroll: input.scroll_delta(),
        };
        for action in Action::ALL {
            if bindings.is_active(input, action) {
                intent.set(action, true);
            }
        }
        intent
    }

    /// Intent with exactly the given actions held.
    pub fn with_actions(actions: &[Action]) -> Self {
        let mut intent = Self::default();
        for &action in actions {
            intent.set(action, true);
        }
        intent
    }

    pub fn set(&mut self, action: Action, held: bool) {
        let bit = 1u32 << action as u32;
        if held {
            self.active |= bit;
        } else {
            self.active &= !bit;
        }
    }

    pub fn is(&self, action: Action) -> bool {
        self.active & (1u32 << action as u32) != 0
    }

    /// Lateral stick: -1 left, +1 right, 0 for none or both.
    pub fn strafe_axis(&self) -> f32 {
        axis(self.is(Action::StrafeLeft), self.is(Action::StrafeRight))
    }

    pub fn is_strafing(&self) -> bool {
        self.is(Action::StrafeLeft) || self.is(Action::StrafeRight)
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
