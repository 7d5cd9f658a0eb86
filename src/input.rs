//! Buffered input state.
//!
//! Event handlers only set and clear the flags in these records; nothing
//! else mutates them mid-frame. The camera and the demos read them once per
//! frame, so there is a single writer even in an event-reentrant loop.

use std::collections::HashSet;

use glam::Vec2;
use sdl2::{keyboard::Keycode, mouse::MouseButton};

use crate::camera::CameraInput;

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

impl KeyboardState {
    /// Clears the one-frame sets; called at the top of every frame.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub fn is_down(&self, key: Keycode) -> bool {
        self.down.contains(&key)
    }

    /// Discrete edge: the key went down during this frame.
    pub fn was_pressed(&self, key: Keycode) -> bool {
        self.pressed.contains(&key)
    }
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
}

impl MouseState {
    pub fn begin_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.pressed.clear();
        self.released.clear();
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down.contains(&button)
    }
}

impl CameraInput {
    /// Samples the held-key flags the camera integrates this frame.
    ///
    /// WASD plus Space/LShift for movement, Left/Right for yaw and
    /// Up/Down for tilt. Arrow keys are not shared with demo-local
    /// discrete actions.
    pub fn from_keyboard(keyboard: &KeyboardState) -> Self {
        Self {
            forward: keyboard.is_down(Keycode::W),
            backward: keyboard.is_down(Keycode::S),
            left: keyboard.is_down(Keycode::A),
            right: keyboard.is_down(Keycode::D),
            up: keyboard.is_down(Keycode::Space),
            down: keyboard.is_down(Keycode::LShift),
            yaw_left: keyboard.is_down(Keycode::Left),
            yaw_right: keyboard.is_down(Keycode::Right),
            pitch_up: keyboard.is_down(Keycode::Up),
            pitch_down: keyboard.is_down(Keycode::Down),
        }
    }
}
