//! GPU mesh buffers and the vertex format they use.
//!
//! - [`Vertex3d`]: position, normal and UV, shared by every pipeline
//! - [`Mesh`]: a vertex buffer plus optional triangle and line index buffers
//!
//! A mesh built with [`Mesh::from_geometry`] carries both index buffers, so the
//! same vertices can be drawn shaded or as a wireframe of their triangle edges.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use wgpu::util::DeviceExt;

use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;

/// A vertex with position, normal, and texture coordinates (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// Position in model space.
    pub position: [f32; 3],
    /// Surface normal, unit length for correct lighting.
    pub normal: [f32; 3],
    /// Texture coordinates, `v` pointing down the image.
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A u32 index buffer and its length.
#[derive(Debug)]
pub(crate) struct IndexBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) count: u32,
}

impl IndexBuffer {
    fn new(gpu: &GpuContext, indices: &[u32], label: &str) -> Option<Self> {
        if indices.is_empty() {
            return None;
        }
        let buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Some(Self {
            buffer,
            count: indices.len() as u32,
        })
    }
}

/// GPU-resident geometry.
///
/// Triangles use counter-clockwise winding for front faces.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    /// Triangle list, for shaded drawing.
    pub(crate) triangles: Option<IndexBuffer>,
    /// Line list, for wireframe drawing.
    pub(crate) lines: Option<IndexBuffer>,
}

impl Mesh {
    fn upload(gpu: &GpuContext, vertices: &[Vertex3d], triangles: &[u32], lines: &[u32]) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            vertex_buffer,
            triangles: IndexBuffer::new(gpu, triangles, "Mesh Triangle Indices"),
            lines: IndexBuffer::new(gpu, lines, "Mesh Line Indices"),
        }
    }

    /// Uploads a triangle mesh together with its unique edges.
    pub fn from_geometry(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        Self::upload(gpu, &geometry.vertices, &geometry.indices, &geometry.edges())
    }

    /// Uploads geometry whose indices are already line pairs, such as
    /// [`RawGeometry::grid`].
    pub fn lines(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        Self::upload(gpu, &geometry.vertices, &[], &geometry.indices)
    }

    /// Uploads a triangle mesh without edges.
    pub fn triangles(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        Self::upload(gpu, &geometry.vertices, &geometry.indices, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 32);
        assert_eq!(Vertex3d::LAYOUT.attributes.len(), 3);
        assert_eq!(Vertex3d::LAYOUT.attributes[2].offset, 24);
    }
}
