//! Core GPU context and device management.
//!
//! [`GpuContext`] owns the wgpu surface, device and queue, plus the surface
//! configuration. It is created once from the window and passed by reference to
//! every pass.

use std::sync::Arc;

use winit::window::Window;

use crate::error::Result;

/// Core GPU context holding wgpu resources.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// Creates buffers, textures and pipelines.
    pub device: wgpu::Device,
    /// Submits command buffers and uploads data.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// MSAA sample count the surface format supports, at most the requested one.
    pub sample_count: u32,
}

impl GpuContext {
    /// Creates the wgpu instance, surface, adapter, device and queue for `window`
    /// and configures the surface with an sRGB format and Fifo presentation.
    ///
    /// `sample_count` is a request; it falls back to 1 if the adapter cannot
    /// multisample the surface format.
    pub fn new(window: Arc<Window>, sample_count: u32) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Gimbal Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let flags = adapter.get_texture_format_features(surface_format).flags;
        let sample_count = if sample_count > 1 && flags.sample_count_supported(sample_count) {
            sample_count
        } else {
            if sample_count > 1 {
                log::warn!("{sample_count}x MSAA unsupported for {surface_format:?}, disabling");
            }
            1
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface {}x{} {:?}, {}x MSAA",
            config.width,
            config.height,
            config.format,
            sample_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
        })
    }

    /// Resizes the surface. Zero-sized dimensions (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
