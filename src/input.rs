//! Input handling for the viewer window.
//!
//! [`Input`] turns raw winit events into per-frame state: keys pressed this
//! frame, buttons held, cursor position in pixels and NDC, drag deltas,
//! scroll, and clicks. A click is a left press and release with little
//! movement in between; anything further is a drag and only orbits the
//! camera.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Movement in pixels beyond which a press becomes a drag.
pub const CLICK_TOLERANCE: f32 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Back, forward and any extra buttons. Tracked but never clicks or drags.
    Other,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Back | WinitMouseButton::Forward | WinitMouseButton::Other(_) => {
                MouseButton::Other
            }
        }
    }
}

/// Keys the viewer responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Escape,
    R,
    T,
    H,
    Key1,
    Key2,
    Key3,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyT => KeyCode::T,
            WinitKeyCode::KeyH => KeyCode::H,
            WinitKeyCode::Digit1 | WinitKeyCode::Numpad1 => KeyCode::Key1,
            WinitKeyCode::Digit2 | WinitKeyCode::Numpad2 => KeyCode::Key2,
            WinitKeyCode::Digit3 | WinitKeyCode::Numpad3 => KeyCode::Key3,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_released: HashSet<MouseButton>,

    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: f32,

    /// Where the current left press started, cleared once it turns into a drag.
    press_origin: Option<Vec2>,
    /// NDC of a click completed this frame.
    click: Option<Vec2>,

    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_released.contains(&button)
    }

    /// Get the mouse position in normalized device coordinates (-1 to 1).
    ///
    /// Origin is at center of window. X increases to the right, Y increases upward.
    pub fn mouse_ndc(&self) -> Vec2 {
        self.to_ndc(self.mouse_position)
    }

    /// Cursor movement this frame while the left button is held, in pixels.
    pub fn drag_delta(&self) -> Vec2 {
        if self.mouse_held(MouseButton::Left) && self.press_origin.is_none() {
            self.mouse_delta
        } else {
            Vec2::ZERO
        }
    }

    /// Get the scroll wheel delta this frame.
    ///
    /// Positive values indicate scrolling up/forward.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// NDC of the click completed this frame, if any.
    pub fn click(&self) -> Option<Vec2> {
        self.click
    }

    /// Called at the start of each frame to clear per-frame state.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
        self.click = None;
    }

    /// Update window size for NDC calculations.
    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    self.key(KeyCode::from(keycode), event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(MouseButton::from(*button), *state);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            _ => {}
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // No repeat while held
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    fn button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_held.insert(button);
                if button == MouseButton::Left {
                    self.press_origin = Some(self.mouse_position);
                }
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
                self.mouse_released.insert(button);
                if button == MouseButton::Left && self.press_origin.take().is_some() {
                    self.click = Some(self.mouse_ndc());
                }
            }
        }
    }

    fn cursor_moved(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
        if let Some(origin) = self.press_origin {
            if origin.distance(position) > CLICK_TOLERANCE {
                self.press_origin = None;
            }
        }
    }

    fn to_ndc(&self, position: Vec2) -> Vec2 {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (position.x / w as f32) * 2.0 - 1.0,
            1.0 - (position.y / h as f32) * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();
        assert!(!input.key_pressed(KeyCode::Space));

        input.key(KeyCode::Space, ElementState::Pressed);
        assert!(input.key_held(KeyCode::Space));
        assert!(input.key_pressed(KeyCode::Space));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.key_held(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));

        // Auto-repeat does not fire again
        input.key(KeyCode::Space, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::Space));
    }

    #[test]
    fn test_mouse_ndc() {
        let mut input = Input::new();
        input.set_window_size(800, 600);

        input.cursor_moved(Vec2::new(400.0, 300.0));
        assert!(input.mouse_ndc().length() < 0.01);

        input.cursor_moved(Vec2::new(0.0, 0.0));
        assert_eq!(input.mouse_ndc(), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_click_without_movement() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor_moved(Vec2::new(600.0, 150.0));

        input.button(MouseButton::Left, ElementState::Pressed);
        input.cursor_moved(Vec2::new(602.0, 151.0));
        input.button(MouseButton::Left, ElementState::Released);

        let click = input.click().unwrap();
        assert!((click.x - 0.505).abs() < 1e-3);
        assert!((click.y - 0.4967).abs() < 1e-3);

        input.begin_frame();
        assert_eq!(input.click(), None);
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor_moved(Vec2::new(100.0, 100.0));

        input.button(MouseButton::Left, ElementState::Pressed);
        input.begin_frame();
        input.cursor_moved(Vec2::new(140.0, 100.0));
        assert_eq!(input.drag_delta(), Vec2::new(40.0, 0.0));

        input.button(MouseButton::Left, ElementState::Released);
        assert_eq!(input.click(), None);
    }

    #[test]
    fn test_right_button_never_clicks() {
        let mut input = Input::new();
        input.button(MouseButton::Right, ElementState::Pressed);
        input.button(MouseButton::Right, ElementState::Released);
        assert_eq!(input.click(), None);
        assert!(input.mouse_released(MouseButton::Right));
    }

    #[test]
    fn test_side_buttons_do_not_act_as_left() {
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Forward), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Other(8)), MouseButton::Other);

        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor_moved(Vec2::new(100.0, 100.0));

        input.button(MouseButton::from(WinitMouseButton::Back), ElementState::Pressed);
        input.begin_frame();
        input.cursor_moved(Vec2::new(140.0, 100.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);
        assert!(!input.mouse_held(MouseButton::Left));

        input.button(MouseButton::from(WinitMouseButton::Back), ElementState::Released);
        assert_eq!(input.click(), None);
    }
}
