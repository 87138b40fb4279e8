use std::path::Path;

use crate::error::Result;
use crate::gpu::GpuContext;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw sRGB RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// A 1x1 white texture, for untextured draws.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(gpu, &img, width, height, &path.display().to_string()))
    }

    /// Procedural wooden crate texture, used when the model's own texture is missing.
    pub fn wood_crate(gpu: &GpuContext, size: u32, seed: u32) -> Self {
        let data = wood_crate_pixels(size, seed);
        Self::from_rgba(gpu, &data, size, size, "Wood Crate Texture")
    }
}

/// RGBA pixels of a plank crate face: horizontal boards with grain, framed by
/// a darker border.
pub fn wood_crate_pixels(size: u32, seed: u32) -> Vec<u8> {
    let mut data = vec![0u8; (size * size * 4) as usize];
    let planks = 4;
    let plank_height = (size / planks).max(1);
    let border = (size / 10).max(1);

    for y in 0..size {
        for x in 0..size {
            let idx = ((y * size + x) * 4) as usize;
            let plank = y / plank_height;

            let base: [i32; 3] = if x < border || y < border || x >= size - border || y >= size - border {
                [96, 62, 32] // frame
            } else if y % plank_height == 0 {
                [70, 45, 22] // gap between boards
            } else {
                [156, 110, 62]
            };

            // Grain runs along the board; shift it per plank so boards differ.
            let grain_phase = (hash(plank, 0, seed) % 64) as f32;
            let grain = ((x as f32 + grain_phase) * 0.35 + (y as f32 * 0.9).sin() * 2.0).sin();
            let noise = (hash(x, y, seed) % 16) as i32 - 8;
            let shade = (grain * 10.0) as i32 + noise;

            data[idx] = (base[0] + shade).clamp(0, 255) as u8;
            data[idx + 1] = (base[1] + shade).clamp(0, 255) as u8;
            data[idx + 2] = (base[2] + shade / 2).clamp(0, 255) as u8;
            data[idx + 3] = 255;
        }
    }

    data
}

/// Integer hash for procedural textures.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wood_crate_is_opaque_and_sized() {
        let pixels = wood_crate_pixels(64, 7);
        assert_eq!(pixels.len(), 64 * 64 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn wood_crate_is_deterministic_per_seed() {
        assert_eq!(wood_crate_pixels(32, 1), wood_crate_pixels(32, 1));
        assert_ne!(wood_crate_pixels(32, 1), wood_crate_pixels(32, 2));
    }

    #[test]
    fn frame_is_darker_than_boards() {
        let size = 64;
        let pixels = wood_crate_pixels(size, 3);
        let red = |x: u32, y: u32| pixels[((y * size + x) * 4) as usize] as i32;
        // Corner sits on the frame, the middle of the second board does not.
        assert!(red(0, 0) < red(size / 2, size / 4 + size / 8));
    }
}
