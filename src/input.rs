use raylib::prelude::*;

use crate::constants::{KEY_SCROLL_STEP, SCROLL_STEP};

/// Keyboard shortcut straight to one end of the scroll region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollJump {
    Start,
    End,
}

/// Everything the active view may react to during one tick.
///
/// The main loop captures this once per tick and hands it to the active view
/// only, so a view that has been torn down never sees input again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFrame {
    pub pointer: Vector2,
    pub pointer_moved: bool,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
    /// Scroll distance in pixels, positive towards the end of the sequence.
    pub scroll: f32,
    pub jump: Option<ScrollJump>,
    pub confirm: bool,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            pointer: Vector2::zero(),
            pointer_moved: false,
            pressed: false,
            down: false,
            released: false,
            scroll: 0.0,
            jump: None,
            confirm: false,
        }
    }
}

impl InputFrame {
    pub fn capture(rl: &RaylibHandle, previous: &InputFrame, viewport_height: f32) -> Self {
        let pointer = rl.get_mouse_position();
        let pointer_moved = pointer.x != previous.pointer.x || pointer.y != previous.pointer.y;

        // Wheel forward scrolls back towards the first frame
        let mut scroll = -rl.get_mouse_wheel_move() * SCROLL_STEP;
        if rl.is_key_down(KeyboardKey::KEY_DOWN) {
            scroll += KEY_SCROLL_STEP;
        }
        if rl.is_key_down(KeyboardKey::KEY_UP) {
            scroll -= KEY_SCROLL_STEP;
        }
        if rl.is_key_pressed(KeyboardKey::KEY_PAGE_DOWN) {
            scroll += viewport_height;
        }
        if rl.is_key_pressed(KeyboardKey::KEY_PAGE_UP) {
            scroll -= viewport_height;
        }

        let jump = if rl.is_key_pressed(KeyboardKey::KEY_HOME) {
            Some(ScrollJump::Start)
        } else if rl.is_key_pressed(KeyboardKey::KEY_END) {
            Some(ScrollJump::End)
        } else {
            None
        };

        Self {
            pointer,
            pointer_moved,
            pressed: rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT),
            down: rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT),
            released: rl.is_mouse_button_released(MouseButton::MOUSE_BUTTON_LEFT),
            scroll,
            jump,
            confirm: rl.is_key_pressed(KeyboardKey::KEY_ENTER)
                || rl.is_key_pressed(KeyboardKey::KEY_SPACE),
        }
    }
}
