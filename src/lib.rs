//! # Gimbal
//!
//! **An interactive playground for 3D rotation representations.**
//!
//! A textured box sits on a grid under an orbiting point light. A control panel
//! edits its position, rotation and scale, and a dropdown switches how the four
//! rotation values are read: as ZYX Euler angles, as a quaternion or as an axis
//! and angle. The box's model matrix is composed as `T · R · S` with an explicit
//! column-major 4x4 multiply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gimbal::{AppConfig, DemoConfig};
//!
//! fn main() -> gimbal::Result<()> {
//!     gimbal::run(AppConfig::new(), DemoConfig::new())
//! }
//! ```
//!
//! ## Using the math on its own
//!
//! ```
//! use gimbal::{compose_transform, Quat, RotationMode, Vec3};
//!
//! let quarter_turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
//! let m = compose_transform(Vec3::ZERO, quarter_turn, 1.0, RotationMode::Quaternion);
//! let p = m.transform_point3(Vec3::X);
//! assert!((p - Vec3::Y).length() < 1e-5);
//! ```
//!
//! ## Controls
//!
//! - Hold the right mouse button to look around, with `WASD` to move and the
//!   wheel to dolly.
//! - `Z` refocuses on the box, `Escape` quits.

mod app;
mod camera;
mod config;
pub mod controls;
mod error;
mod fly_camera;
mod geometry;
mod gpu;
mod gui;
mod input;
mod light;
mod matrix;
mod mesh;
pub mod rotation;
mod scene_pass;
mod texture;

pub use app::run;
pub use camera::Camera;
pub use config::{AppConfig, DemoConfig};
pub use controls::{BoxState, Controls};
pub use error::{Error, Result};
pub use fly_camera::FlyCamera;
pub use geometry::{Model, PendingGeometry, RawGeometry};
pub use gpu::GpuContext;
pub use gui::Gui;
pub use input::Input;
pub use light::{LightKind, LightOrbit, LightUniforms, PointLight};
pub use matrix::Matrix;
pub use mesh::{Mesh, Vertex3d};
pub use rotation::{
    RotationMode, compose_transform, normalize_quat, quat_from_axis_angle, quat_to_axis_angle,
    quat_to_euler_zyx, rotation_matrix,
};
pub use scene_pass::{CameraUniforms, DrawCall, DrawStyle, LIGHTING_WGSL, ScenePass, TextureBinding};
pub use texture::{Texture, wood_crate_pixels};

// Re-export glam math types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
