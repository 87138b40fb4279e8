//! 3D scene rendering with lighting, wireframes and MSAA.
//!
//! [`ScenePass`] draws a list of [`DrawCall`]s into the surface in a single
//! render pass. Each call picks a [`DrawStyle`]:
//!
//! - `Lit`: textured triangles shaded by the scene light
//! - `Unlit`: flat-colored triangles (the light marker)
//! - `Lines`: flat-colored line list (grid and wireframes)
//!
//! # Bind groups
//!
//! - **Group 0**: camera uniforms (binding 0) and light uniforms (binding 1)
//! - **Group 1**: model uniforms, one slot per draw selected by dynamic offset
//! - **Group 2**: diffuse texture and sampler (lit draws only)
//!
//! Model uniforms for the whole frame are written into one buffer before the
//! pass starts, so every draw sees its own matrix.

use std::borrow::Cow;

use glam::Mat4;

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::light::LightUniforms;
use crate::matrix::Matrix;
use crate::mesh::{Mesh, Vertex3d};
use crate::texture::Texture;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The built-in lighting shader.
pub const LIGHTING_WGSL: &str = include_str!("shaders/lighting.wgsl");
const UNLIT_WGSL: &str = include_str!("shaders/unlit.wgsl");

const INITIAL_MODEL_SLOTS: u64 = 8;
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Camera uniforms (group 0, binding 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    /// Elapsed time in seconds.
    pub time: f32,
}

impl CameraUniforms {
    /// Captures `camera` for a surface with the given aspect ratio.
    pub fn new(camera: &Camera, aspect: f32, time: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            view_pos: camera.position.to_array(),
            time,
        }
    }
}

/// Per-draw model uniforms (group 1, binding 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for transforming normals.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ModelUniforms {
    /// Packs `transform` with its normal matrix. Singular transforms get
    /// identity normals.
    pub fn new(transform: Matrix, color: [f32; 4]) -> Self {
        let model = Mat4::from(transform);
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: transform.to_cols_array_2d(),
            normal_matrix: normal.to_cols_array_2d(),
            color,
        }
    }
}

/// How a draw call is rasterized and shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStyle {
    Lit,
    Unlit,
    Lines,
}

/// A texture prepared for binding in lit draws.
#[derive(Debug)]
pub struct TextureBinding {
    bind_group: wgpu::BindGroup,
}

/// One mesh to draw this frame.
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    pub style: DrawStyle,
    pub transform: Matrix,
    /// Tint for lit draws, flat color otherwise.
    pub color: [f32; 4],
    /// Lit draws only. `None` samples plain white.
    pub texture: Option<&'a TextureBinding>,
}

struct RenderTargets {
    size: (u32, u32),
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl RenderTargets {
    fn new(gpu: &GpuContext) -> Self {
        let size = wgpu::Extent3d {
            width: gpu.width(),
            height: gpu.height(),
            depth_or_array_layers: 1,
        };

        let depth = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: gpu.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa_view = (gpu.sample_count > 1).then(|| {
            gpu.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("Scene MSAA Color Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count: gpu.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: gpu.config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self {
            size: (gpu.width(), gpu.height()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa_view,
        }
    }
}

/// Renders the 3D scene.
pub struct ScenePass {
    lit_pipeline: wgpu::RenderPipeline,
    unlit_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_bind_group_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_slots: u64,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    white: TextureBinding,
    targets: RenderTargets,
}

impl ScenePass {
    /// Builds the pipelines. `lighting_override` replaces the built-in lighting
    /// shader; if it fails validation the built-in shader is used instead.
    pub fn new(gpu: &GpuContext, lighting_override: Option<&str>) -> Self {
        let device = &gpu.device;

        let frame_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT, false),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let model_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
            )],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = model_stride(alignment);
        let (model_buffer, model_bind_group) =
            create_model_slots(device, &model_bind_group_layout, model_stride, INITIAL_MODEL_SLOTS);

        let texture_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &model_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let unlit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Unlit Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let lit_pipeline = match lighting_override {
            Some(source) => {
                device.push_error_scope(wgpu::ErrorFilter::Validation);
                let pipeline = build_pipeline(gpu, &lit_layout, "Lit", source, wgpu::PrimitiveTopology::TriangleList);
                match pollster::block_on(device.pop_error_scope()) {
                    None => pipeline,
                    Some(err) => {
                        log::warn!("lighting shader rejected, using built-in: {err}");
                        build_pipeline(gpu, &lit_layout, "Lit", LIGHTING_WGSL, wgpu::PrimitiveTopology::TriangleList)
                    }
                }
            }
            None => build_pipeline(gpu, &lit_layout, "Lit", LIGHTING_WGSL, wgpu::PrimitiveTopology::TriangleList),
        };

        let unlit_pipeline =
            build_pipeline(gpu, &unlit_layout, "Unlit", UNLIT_WGSL, wgpu::PrimitiveTopology::TriangleList);
        let line_pipeline = build_pipeline(gpu, &unlit_layout, "Line", UNLIT_WGSL, wgpu::PrimitiveTopology::LineList);

        let white_texture = Texture::white(gpu);
        let white = TextureBinding {
            bind_group: create_texture_bind_group(device, &texture_bind_group_layout, &white_texture),
        };

        Self {
            lit_pipeline,
            unlit_pipeline,
            line_pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            model_bind_group_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_slots: INITIAL_MODEL_SLOTS,
            texture_bind_group_layout,
            white,
            targets: RenderTargets::new(gpu),
        }
    }

    /// Prepares a texture for use in lit draw calls.
    pub fn bind_texture(&self, gpu: &GpuContext, texture: &Texture) -> TextureBinding {
        TextureBinding {
            bind_group: create_texture_bind_group(&gpu.device, &self.texture_bind_group_layout, texture),
        }
    }

    fn ensure_targets(&mut self, gpu: &GpuContext) {
        if self.targets.size != (gpu.width(), gpu.height()) {
            self.targets = RenderTargets::new(gpu);
        }
    }

    fn ensure_model_slots(&mut self, gpu: &GpuContext, needed: u64) {
        if needed <= self.model_slots {
            return;
        }
        let slots = needed.next_power_of_two();
        let (buffer, bind_group) =
            create_model_slots(&gpu.device, &self.model_bind_group_layout, self.model_stride, slots);
        self.model_buffer = buffer;
        self.model_bind_group = bind_group;
        self.model_slots = slots;
    }

    /// Clears `target` and draws `draws` into it, resolving MSAA if enabled.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        camera: &CameraUniforms,
        light: &LightUniforms,
        draws: &[DrawCall],
    ) {
        self.ensure_targets(gpu);
        self.ensure_model_slots(gpu, draws.len() as u64);

        gpu.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        gpu.queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(light));

        let mut slots = vec![0u8; (self.model_stride * draws.len() as u64) as usize];
        for (i, call) in draws.iter().enumerate() {
            let uniforms = ModelUniforms::new(call.transform, call.color);
            let offset = i * self.model_stride as usize;
            slots[offset..offset + std::mem::size_of::<ModelUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if !slots.is_empty() {
            gpu.queue.write_buffer(&self.model_buffer, 0, &slots);
        }

        let (view, resolve_target) = match &self.targets.msaa_view {
            Some(msaa) => (msaa, Some(target)),
            None => (target, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, call) in draws.iter().enumerate() {
            let (pipeline, indices) = match call.style {
                DrawStyle::Lit => (&self.lit_pipeline, &call.mesh.triangles),
                DrawStyle::Unlit => (&self.unlit_pipeline, &call.mesh.triangles),
                DrawStyle::Lines => (&self.line_pipeline, &call.mesh.lines),
            };
            let Some(indices) = indices else {
                log::trace!("skipping {:?} draw of a mesh without matching indices", call.style);
                continue;
            };

            pass.set_pipeline(pipeline);
            let offset = (i as u64 * self.model_stride) as wgpu::DynamicOffset;
            pass.set_bind_group(1, &self.model_bind_group, &[offset]);
            if call.style == DrawStyle::Lit {
                let texture = call.texture.unwrap_or(&self.white);
                pass.set_bind_group(2, &texture.bind_group, &[]);
            }

            pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..indices.count, 0, 0..1);
        }
    }
}

/// Size of one model slot, rounded up to the device's uniform offset alignment.
fn model_stride(alignment: u64) -> u64 {
    let size = std::mem::size_of::<ModelUniforms>() as u64;
    size.div_ceil(alignment) * alignment
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_model_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Model Uniform Slots"),
        size: stride * slots,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Model Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
            }),
        }],
    });

    (buffer, bind_group)
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Diffuse Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn build_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    name: &str,
    source: &str,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    let device = &gpu.device;
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{name} Shader")),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });

    let triangles = topology == wgpu::PrimitiveTopology::TriangleList;

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name} Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs"),
            buffers: &[Vertex3d::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs"),
            targets: &[Some(wgpu::ColorTargetState {
                format: gpu.config.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: triangles.then_some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: gpu.sample_count,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}
