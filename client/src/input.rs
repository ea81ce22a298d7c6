//! Keyboard mapping for the frame loop.

use macroquad::prelude::*;
use shared::Direction;

/// One frame's worth of decoded input.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFrame {
    pub direction: Option<Direction>,
    pub pause: bool,
    pub reset: bool,
}

/// Samples the keyboard for this frame. Arrow keys and WASD both steer;
/// when several direction keys fire in the same frame the first match
/// wins. Press-edge sampling, so a held key fires once.
pub fn poll() -> InputFrame {
    let direction = if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
        Some(Direction::Up)
    } else if is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S) {
        Some(Direction::Down)
    } else if is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A) {
        Some(Direction::Left)
    } else if is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D) {
        Some(Direction::Right)
    } else {
        None
    };

    InputFrame {
        direction,
        pause: is_key_pressed(KeyCode::P),
        reset: is_key_pressed(KeyCode::R),
    }
}
