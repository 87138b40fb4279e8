use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard and mouse state, rebuilt from window events.
///
/// Held state persists across frames; pressed/released sets and the mouse and
/// scroll deltas only cover the current frame and are cleared by
/// [`Input::begin_frame`].
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

impl Input {
    /// Empty state: nothing held, cursor outside the window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per frame, after the frame has consumed this frame's input.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.set_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            // Key repeat arrives as further presses; only the first counts.
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.buttons_down.insert(button) {
                self.buttons_pressed.insert(button);
            }
        } else if self.buttons_down.remove(&button) {
            self.buttons_released.insert(button);
        }
    }

    /// Records a cursor position. The first position after entering the window
    /// produces no delta.
    pub fn move_cursor(&mut self, position: Vec2) {
        if let Some(previous) = self.mouse_position {
            self.mouse_delta += position - previous;
        }
        self.mouse_position = Some(position);
    }

    /// Drops every held key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_released.extend(self.keys_down.drain());
        self.buttons_released.extend(self.buttons_down.drain());
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Cursor position in physical pixels, if the cursor is over the window.
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Cursor movement this frame in physical pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll this frame, in lines.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        // SAFETY: only used to build synthetic events, never passed to winit.
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn key_press_is_edge_triggered() {
        let mut input = Input::new();
        input.set_key(KeyCode::KeyZ, true);
        assert!(input.key_pressed(KeyCode::KeyZ));
        assert!(input.key_down(KeyCode::KeyZ));

        input.begin_frame();
        input.set_key(KeyCode::KeyZ, true); // repeat
        assert!(!input.key_pressed(KeyCode::KeyZ));
        assert!(input.key_down(KeyCode::KeyZ));

        input.set_key(KeyCode::KeyZ, false);
        assert!(input.key_released(KeyCode::KeyZ));
        assert!(!input.key_down(KeyCode::KeyZ));
    }

    #[test]
    fn mouse_buttons_from_events() {
        let mut input = Input::new();
        input.handle_event(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        });
        assert!(input.mouse_pressed(MouseButton::Right));
        assert!(input.mouse_down(MouseButton::Right));

        input.begin_frame();
        input.handle_event(&WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: MouseButton::Right,
        });
        assert!(input.mouse_released(MouseButton::Right));
        assert!(!input.mouse_down(MouseButton::Right));
    }

    #[test]
    fn cursor_delta_accumulates_within_frame() {
        let mut input = Input::new();
        for (x, y) in [(100.0, 100.0), (110.0, 95.0), (130.0, 90.0)] {
            input.handle_event(&WindowEvent::CursorMoved {
                device_id: device(),
                position: PhysicalPosition::new(x, y),
            });
        }
        assert_eq!(input.mouse_delta(), Vec2::new(30.0, -10.0));
        assert_eq!(input.mouse_position(), Some(Vec2::new(130.0, 90.0)));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_lines_and_pixels() {
        let mut input = Input::new();
        input.handle_event(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        });
        input.handle_event(&WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 240.0)),
            phase: TouchPhase::Moved,
        });
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 3.0));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = Input::new();
        input.set_key(KeyCode::KeyW, true);
        input.set_button(MouseButton::Right, true);

        input.handle_event(&WindowEvent::Focused(false));

        assert!(!input.key_down(KeyCode::KeyW));
        assert!(!input.mouse_down(MouseButton::Right));
        assert!(input.key_released(KeyCode::KeyW));
    }
}
