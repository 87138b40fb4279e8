//! A single scene light and its orbit animation.

use glam::Vec3;

/// Whether a light shines from a position or along a direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    /// Parallel rays travelling from `position` toward `target`.
    Directional,
    /// Rays radiating from `position`.
    #[default]
    Point,
}

impl LightKind {
    fn as_u32(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
        }
    }
}

/// A light with a kind, placement and color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub kind: LightKind,
    pub position: Vec3,
    pub target: Vec3,
    /// Linear RGBA, components in `[0, 1]`.
    pub color: [f32; 4],
    pub enabled: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: Vec3::new(4.0, 4.0, -2.0),
            target: Vec3::ZERO,
            color: PointLight::RAYWHITE,
            enabled: true,
        }
    }
}

impl PointLight {
    /// Off-white `(245, 245, 245)`.
    pub const RAYWHITE: [f32; 4] = [245.0 / 255.0, 245.0 / 255.0, 245.0 / 255.0, 1.0];

    /// An off-white light of `kind` at `position`, aimed at the origin.
    pub fn new(kind: LightKind, position: impl Into<Vec3>) -> Self {
        Self {
            kind,
            position: position.into(),
            ..Default::default()
        }
    }

    /// Sets the point a directional light shines toward.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the light color, also used for its marker sphere.
    pub fn color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Packs this light and the scene ambient term for the lighting shader.
    pub fn uniforms(&self, ambient: [f32; 4]) -> LightUniforms {
        LightUniforms {
            ambient,
            color: self.color,
            position: self.position.to_array(),
            kind: self.kind.as_u32(),
            target: self.target.to_array(),
            enabled: self.enabled as u32,
        }
    }
}

/// Moves a light on a horizontal circle around the Y axis.
///
/// Height is left alone so the panel's height slider keeps working while the
/// light orbits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightOrbit {
    /// Angular speed in radians per second.
    pub speed: f32,
    pub radius: f32,
    /// Accumulated time in seconds.
    pub time: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            speed: 2.0,
            radius: 6.0,
            time: 0.0,
        }
    }
}

impl LightOrbit {
    pub fn new(speed: f32, radius: f32) -> Self {
        Self {
            speed,
            radius,
            time: 0.0,
        }
    }

    /// Advances the orbit by `dt` seconds and repositions `light`.
    pub fn update(&mut self, light: &mut PointLight, dt: f32) {
        self.time += dt;
        let angle = self.speed * self.time;
        light.position.x = self.radius * angle.cos();
        light.position.z = self.radius * angle.sin();
    }
}

/// Light data for the lighting shader (group 0, binding 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub ambient: [f32; 4],
    pub color: [f32; 4],
    pub position: [f32; 3],
    /// 0 = directional, 1 = point.
    pub kind: u32,
    pub target: [f32; 3],
    pub enabled: u32,
}
