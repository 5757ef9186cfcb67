//! Input handling for keyboard and pointer.
//!
//! The windowing layer feeds raw key transitions and the pointer's world
//! position in here; the simulation only ever reads the per-frame view.

use glam::Vec2;
use std::collections::HashSet;

/// Keys the simulation cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    ShiftLeft,
    ShiftRight,
    Space,
    Escape,
}

/// Key transition reported by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Pressed,
    Released,
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,

    /// Pointer position projected into world coordinates.
    aim_target: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Process pointer movement, already converted to world space.
    pub fn process_aim_target(&mut self, world_position: Vec2) {
        self.aim_target = world_position;
    }

    // Query methods

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// World position the player is aiming at.
    pub fn aim_target(&self) -> Vec2 {
        self.aim_target
    }

    /// Get movement input as a normalized vector (WASD or arrows). +Y is up.
    pub fn get_movement_input(&self) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if self.is_key_held(KeyCode::KeyW) || self.is_key_held(KeyCode::ArrowUp) {
            movement.y += 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) || self.is_key_held(KeyCode::ArrowDown) {
            movement.y -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyA) || self.is_key_held(KeyCode::ArrowLeft) {
            movement.x -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) || self.is_key_held(KeyCode::ArrowRight) {
            movement.x += 1.0;
        }

        movement.normalize_or_zero()
    }

    /// Check if the special ability key was pressed (Space).
    pub fn is_special_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space)
    }

    /// Check if pause was pressed (Escape).
    pub fn is_pause_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Escape)
    }

    /// Check if the form-cycle key was pressed (either Shift).
    pub fn is_cycle_form_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::ShiftLeft) || self.is_key_pressed(KeyCode::ShiftRight)
    }

    /// Index of a form hotkey (1-4) pressed this frame, zero-based.
    pub fn form_hotkey_pressed(&self) -> Option<usize> {
        [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4]
            .iter()
            .position(|k| self.is_key_pressed(*k))
    }
}
