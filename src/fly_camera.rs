//! Free-flying camera controller.
//!
//! [`FlyCamera`] edits a [`Camera`] in place. Mouse movement turns the view by
//! swinging the target around the eye, WASD moves eye and target together,
//! Space and Left Shift move along world up, and the scroll wheel dollies the
//! eye toward the target. Look and movement are only applied while the
//! controller is active (the demo activates it while the right mouse button is
//! held). The focus shortcut works regardless.
//!
//! ```ignore
//! let active = input.mouse_down(MouseButton::Right) && !gui.wants_pointer();
//! fly.update(&mut camera, &input, dt, active);
//! ```

use glam::{Quat, Vec3};
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::input::Input;

/// Smallest angle kept between the view direction and world up.
const POLE_MARGIN: f32 = 0.01;

/// Mouse-look and WASD controller for a [`Camera`].
#[derive(Clone, Debug)]
pub struct FlyCamera {
    /// Radians per pixel of mouse movement.
    pub sensitivity: f32,
    /// Units per second.
    pub speed: f32,
    /// Units per scroll line.
    pub zoom_speed: f32,
    /// Closest the eye may dolly toward the target.
    pub min_distance: f32,
    /// Key that snaps the target to `focus_target`.
    pub focus_key: KeyCode,
    /// Where the focus key points the camera.
    pub focus_target: Vec3,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            sensitivity: 0.003,
            speed: 5.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            focus_key: KeyCode::KeyZ,
            focus_target: Vec3::new(0.0, 0.5, 0.0),
        }
    }
}

impl FlyCamera {
    /// Default controller: `Z` focuses on (0, 0.5, 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mouse-look rate in radians per pixel.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the movement speed in units per second.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Binds `key` to snap the target to `target`.
    pub fn focus(mut self, key: KeyCode, target: impl Into<Vec3>) -> Self {
        self.focus_key = key;
        self.focus_target = target.into();
        self
    }

    /// Applies this frame's input to `camera`.
    pub fn update(&self, camera: &mut Camera, input: &Input, dt: f32, active: bool) {
        if input.key_pressed(self.focus_key) {
            camera.target = self.focus_target;
        }

        if !active {
            return;
        }

        let delta = input.mouse_delta();
        self.look(camera, -delta.x * self.sensitivity, -delta.y * self.sensitivity);

        let mut velocity = Vec3::ZERO;
        if input.key_down(KeyCode::KeyW) {
            velocity += camera.forward();
        }
        if input.key_down(KeyCode::KeyS) {
            velocity -= camera.forward();
        }
        if input.key_down(KeyCode::KeyD) {
            velocity += camera.right();
        }
        if input.key_down(KeyCode::KeyA) {
            velocity -= camera.right();
        }
        if input.key_down(KeyCode::Space) {
            velocity += Vec3::Y;
        }
        if input.key_down(KeyCode::ShiftLeft) {
            velocity -= Vec3::Y;
        }
        if velocity.length_squared() > 0.0 {
            let step = velocity.normalize() * self.speed * dt;
            camera.position += step;
            camera.target += step;
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            self.dolly(camera, scroll * self.zoom_speed);
        }
    }

    /// Turns the view by `yaw` about world up and `pitch` about the camera's
    /// right axis, keeping the eye fixed.
    pub fn look(&self, camera: &mut Camera, yaw: f32, pitch: f32) {
        let offset = camera.target - camera.position;
        let distance = offset.length();
        if distance == 0.0 {
            return;
        }

        let forward = offset / distance;
        let current_pitch = forward.dot(camera.up).clamp(-1.0, 1.0).asin();
        let limit = std::f32::consts::FRAC_PI_2 - POLE_MARGIN;
        let pitch = (current_pitch + pitch).clamp(-limit, limit) - current_pitch;

        let rotation = Quat::from_axis_angle(camera.up, yaw) * Quat::from_axis_angle(camera.right(), pitch);
        camera.target = camera.position + rotation * offset;
    }

    /// Moves the eye `amount` units toward the target, stopping at
    /// `min_distance`.
    pub fn dolly(&self, camera: &mut Camera, amount: f32) {
        let offset = camera.target - camera.position;
        let distance = offset.length();
        if distance == 0.0 {
            return;
        }
        let new_distance = (distance - amount).max(self.min_distance);
        camera.position = camera.target - offset / distance * new_distance;
    }
}
