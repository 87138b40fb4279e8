use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::config::{AppConfig, DemoConfig};
use crate::controls::Controls;
use crate::error::{Error, Result};
use crate::fly_camera::FlyCamera;
use crate::geometry::{PendingGeometry, RawGeometry};
use crate::gpu::GpuContext;
use crate::gui::Gui;
use crate::input::Input;
use crate::light::{LightOrbit, PointLight};
use crate::matrix::Matrix;
use crate::mesh::Mesh;
use crate::rotation::compose_transform;
use crate::scene_pass::{CameraUniforms, DrawCall, DrawStyle, ScenePass, TextureBinding};
use crate::texture::Texture;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const GRID_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
const LIGHT_MARKER_RADIUS: f32 = 0.2;
const CRATE_TEXTURE_SIZE: u32 = 256;
const CRATE_TEXTURE_SEED: u32 = 7;

/// Opens the window and runs the demo until it is closed.
///
/// Asset problems are logged and replaced by built-in fallbacks; only window,
/// GPU and event loop failures are returned.
///
/// ```no_run
/// use gimbal::{AppConfig, DemoConfig};
///
/// gimbal::run(AppConfig::new().msaa(1), DemoConfig::new().builtin_shader())?;
/// # Ok::<(), gimbal::Error>(())
/// ```
pub fn run(config: AppConfig, demo: DemoConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GimbalApp::Pending { config, demo };
    event_loop.run_app(&mut app)?;

    match app {
        GimbalApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum GimbalApp {
    Pending { config: AppConfig, demo: DemoConfig },
    Running(Box<Demo>),
    Failed(Error),
}

/// Everything alive while the window is open.
struct Demo {
    window: Arc<Window>,
    gpu: GpuContext,
    gui: Gui,
    scene: ScenePass,
    box_mesh: Mesh,
    box_texture: TextureBinding,
    grid: Mesh,
    light_marker: Mesh,
    camera: Camera,
    fly_camera: FlyCamera,
    input: Input,
    controls: Controls,
    light: PointLight,
    orbit: LightOrbit,
    ambient: [f32; 4],
    frame_interval: Option<Duration>,
    start_time: Instant,
    last_frame: Instant,
    fps: f32,
}

impl Demo {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig, demo: &DemoConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone(), config.sample_count)?;
        let gui = Gui::new(&gpu, &window);

        let shader = demo.shader_path.as_deref().and_then(|path| match read_shader(path) {
            Ok(source) => Some(source),
            Err(err) => {
                log::warn!("{err}, using built-in lighting shader");
                None
            }
        });
        let scene = ScenePass::new(&gpu, shader.as_deref());

        let (geometry, texture) = load_box(&gpu, &demo.model_path);
        let box_mesh = Mesh::from_geometry(&gpu, &geometry);
        let box_texture = scene.bind_texture(&gpu, &texture);
        let grid = Mesh::lines(&gpu, &RawGeometry::grid(demo.grid_slices, demo.grid_spacing));
        let light_marker = Mesh::triangles(&gpu, &RawGeometry::sphere(16, 16, LIGHT_MARKER_RADIUS));

        let controls = Controls::new();
        let mut light = demo.light;
        light.position.y = controls.light_height;
        let orbit = LightOrbit::new(controls.light_speed, demo.light_orbit_radius);

        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            gui,
            scene,
            box_mesh,
            box_texture,
            grid,
            light_marker,
            camera: demo.camera,
            fly_camera: FlyCamera::new(),
            input: Input::new(),
            controls,
            light,
            orbit,
            ambient: demo.ambient,
            frame_interval: config
                .target_fps
                .filter(|&fps| fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / fps as f64)),
            start_time: now,
            last_frame: now,
            fps: 0.0,
        })
    }

    fn handle_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        let consumed = self.gui.on_window_event(&self.window, &event);
        if !consumed || passes_through(&event) {
            self.input.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.gpu.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if dt > 0.0 {
            self.fps = if self.fps == 0.0 {
                1.0 / dt
            } else {
                self.fps * 0.9 + 0.1 / dt
            };
        }

        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        if !self.gui.wants_keyboard() {
            let active = self.input.mouse_down(MouseButton::Right) && !self.gui.wants_pointer();
            self.fly_camera.update(&mut self.camera, &self.input, dt, active);
        }

        self.orbit.speed = self.controls.light_speed;
        self.light.position.y = self.controls.light_height;
        self.orbit.update(&mut self.light, dt);

        self.render(event_loop);
        self.input.begin_frame();
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        let state = &self.controls.box_state;
        let box_transform = compose_transform(state.position, state.rotation, state.scale, self.controls.mode);
        let box_draw = if self.controls.draw_faces {
            DrawCall {
                mesh: &self.box_mesh,
                style: DrawStyle::Lit,
                transform: box_transform,
                color: WHITE,
                texture: Some(&self.box_texture),
            }
        } else {
            DrawCall {
                mesh: &self.box_mesh,
                style: DrawStyle::Lines,
                transform: box_transform,
                color: WHITE,
                texture: None,
            }
        };

        let draws = [
            DrawCall {
                mesh: &self.light_marker,
                style: DrawStyle::Unlit,
                transform: Matrix::translation(self.light.position),
                color: self.light.color,
                texture: None,
            },
            box_draw,
            DrawCall {
                mesh: &self.grid,
                style: DrawStyle::Lines,
                transform: Matrix::IDENTITY,
                color: GRID_COLOR,
                texture: None,
            },
        ];

        let time = self.start_time.elapsed().as_secs_f32();
        let camera = CameraUniforms::new(&self.camera, self.gpu.aspect(), time);
        let light = self.light.uniforms(self.ambient);
        self.scene
            .render(&self.gpu, &mut encoder, &view, &camera, &light, &draws);

        let fps = self.fps;
        let controls = &mut self.controls;
        let gui_commands = self
            .gui
            .paint(&self.gpu, &self.window, &mut encoder, &view, |ctx| controls.show(ctx, fps));

        self.gpu
            .queue
            .submit(gui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        self.window.pre_present_notify();
        output.present();
    }

    /// Schedules the next redraw, honoring the target frame rate if one is set.
    fn schedule(&self, event_loop: &ActiveEventLoop) {
        match self.frame_interval {
            Some(interval) => {
                let next = self.last_frame + interval;
                if Instant::now() >= next {
                    self.window.request_redraw();
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(next));
            }
            None => {
                self.window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Poll);
            }
        }
    }
}

impl ApplicationHandler for GimbalApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let GimbalApp::Pending { config, demo } = self {
            *self = match Demo::new(event_loop, config, demo) {
                Ok(demo) => {
                    log::info!("demo running");
                    GimbalApp::Running(Box::new(demo))
                }
                Err(err) => {
                    event_loop.exit();
                    GimbalApp::Failed(err)
                }
            };
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let GimbalApp::Running(demo) = self {
            demo.handle_event(event_loop, event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let GimbalApp::Running(demo) = self {
            demo.schedule(event_loop);
        }
    }
}

fn read_shader(path: &Path) -> Result<String> {
    let source =
        fs::read_to_string(path).map_err(|err| Error::Shader(format!("cannot read {}: {err}", path.display())))?;
    log::info!("lighting shader override {}", path.display());
    Ok(source)
}

/// Loads the box model and its diffuse texture, falling back to a unit cube and
/// a procedural crate texture.
fn load_box(gpu: &GpuContext, path: &Path) -> (RawGeometry, Texture) {
    let crate_texture = || Texture::wood_crate(gpu, CRATE_TEXTURE_SIZE, CRATE_TEXTURE_SEED);

    match PendingGeometry::from_file(path).centered().normalized().load() {
        Ok(model) => {
            let texture = match model.diffuse_texture {
                Some(texture_path) => Texture::from_file(gpu, &texture_path).unwrap_or_else(|err| {
                    log::warn!("failed to load texture {}: {err}", texture_path.display());
                    crate_texture()
                }),
                None => crate_texture(),
            };
            (model.geometry, texture)
        }
        Err(err) => {
            log::warn!("{err}, using built-in cube");
            (RawGeometry::cube(), crate_texture())
        }
    }
}

/// Whether `event` still reaches [`Input`] after egui consumed it. Releases and
/// cursor motion always pass so held state cannot get stuck under a panel.
fn passes_through(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => event.state == ElementState::Released,
        WindowEvent::MouseInput { state, .. } => *state == ElementState::Released,
        WindowEvent::MouseWheel { .. } => false,
        _ => true,
    }
}
