//! Window and scene configuration.
//!
//! Both structs are plain builders with sensible defaults; there is no config
//! file. [`AppConfig`] covers the window and frame pacing, [`DemoConfig`] the
//! assets and the initial scene.
//!
//! ```
//! use gimbal::{AppConfig, DemoConfig};
//!
//! let app = AppConfig::new().title("Rotations").size(1280, 720).msaa(1);
//! let demo = DemoConfig::new().model("assets/crate.obj").builtin_shader();
//! assert_eq!(app.sample_count, 1);
//! assert!(demo.shader_path.is_none());
//! assert!(DemoConfig::new().shader_path.is_some());
//! ```

use std::path::PathBuf;

use glam::Vec3;

use crate::camera::Camera;
use crate::light::PointLight;

/// Configuration for the app window.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// MSAA sample count for the scene pass. 1 disables multisampling.
    pub sample_count: u32,
    /// Frame rate cap. `None` renders as fast as presentation allows.
    pub target_fps: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Gimbal".to_string(),
            width: 1080,
            height: 720,
            sample_count: 4,
            target_fps: Some(120),
        }
    }
}

impl AppConfig {
    /// Default window: 1080x720, 4x MSAA, capped at 120 fps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial window size in logical pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the MSAA sample count. wgpu only guarantees 1 and 4.
    pub fn msaa(mut self, samples: u32) -> Self {
        self.sample_count = samples.max(1);
        self
    }

    /// Caps the frame rate. `None` or `Some(0)` leaves it uncapped.
    pub fn target_fps(mut self, fps: Option<u32>) -> Self {
        self.target_fps = fps.filter(|&f| f > 0);
        self
    }
}

/// Assets and starting scene for the demo.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Model to load. `.obj` and `.stl` are recognised.
    pub model_path: PathBuf,
    /// WGSL file replacing the built-in lighting shader, if present.
    pub shader_path: Option<PathBuf>,
    pub camera: Camera,
    pub light: PointLight,
    /// Ambient term added to every lit fragment.
    pub ambient: [f32; 4],
    /// Orbit radius of the light around the Y axis.
    pub light_orbit_radius: f32,
    /// Half-extent of the ground grid in cells.
    pub grid_slices: u32,
    pub grid_spacing: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("resources/models/box/wooden_box.obj"),
            shader_path: Some(PathBuf::from("resources/shaders/lighting.wgsl")),
            camera: Camera::new()
                .at(Vec3::new(10.0, 10.0, 10.0))
                .looking_at(Vec3::ZERO)
                .with_fov(45.0),
            light: PointLight::default(),
            ambient: [0.1, 0.1, 0.1, 1.0],
            light_orbit_radius: 6.0,
            grid_slices: 10,
            grid_spacing: 1.0,
        }
    }
}

impl DemoConfig {
    /// The bundled box, the shader override path and the default scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model file.
    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Overrides the lighting shader with a WGSL file.
    pub fn shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader_path = Some(path.into());
        self
    }

    /// Always use the built-in lighting shader.
    pub fn builtin_shader(mut self) -> Self {
        self.shader_path = None;
        self
    }

    /// Sets the starting camera.
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Sets the light. Its height is replaced by the panel's LHeight slider.
    pub fn light(mut self, light: PointLight) -> Self {
        self.light = light;
        self
    }

    /// Sets the ambient color of the lighting shader.
    pub fn ambient(mut self, ambient: [f32; 4]) -> Self {
        self.ambient = ambient;
        self
    }
}
