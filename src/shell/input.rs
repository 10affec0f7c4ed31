use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::core::{Button, PointerButton};

/// Pixel deltas per wheel notch on touchpads
const PIXELS_PER_STEP: f32 = 50.0;

pub fn key_to_button(keycode: KeyCode) -> Option<Button> {
    match keycode {
        KeyCode::KeyW => Some(Button::KeyW),
        KeyCode::KeyA => Some(Button::KeyA),
        KeyCode::KeyS => Some(Button::KeyS),
        KeyCode::KeyD => Some(Button::KeyD),
        KeyCode::ArrowUp => Some(Button::ArrowUp),
        KeyCode::ArrowDown => Some(Button::ArrowDown),
        KeyCode::ArrowLeft => Some(Button::ArrowLeft),
        KeyCode::ArrowRight => Some(Button::ArrowRight),
        KeyCode::Escape => Some(Button::Escape),
        _ => None,
    }
}

pub fn mouse_to_pointer(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Wheel delta as dolly steps; scrolling up zooms in
pub fn scroll_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_STEP,
    }
}
