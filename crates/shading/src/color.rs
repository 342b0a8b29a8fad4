use crate::palette::Palette;
use glam::{Vec3, Vec4};
use morphsphere_common::ShaderUniforms;

/// Palette amplitude (contrast) used by the colour stage.
pub const CONTRAST: Vec3 = Vec3::new(0.3, 0.3, 0.3);
/// Palette frequency (oscillation) used by the colour stage.
pub const OSCILLATION: Vec3 = Vec3::new(0.5, 0.5, 0.9);
/// Palette phase used by the colour stage.
pub const PHASE: Vec3 = Vec3::new(0.9, 0.1, 0.8);
/// Scale applied to the distortion before it indexes the palette.
pub const DISTORTION_GAIN: f32 = 3.0;

/// Caps a driven value at 1.0. Only the upper bound is enforced: negative
/// values pass through unchanged.
pub fn cap_upper(value: f32) -> f32 {
    value.min(1.0)
}

/// CPU reference of the pixel stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorShader;

impl ColorShader {
    pub fn new() -> Self {
        Self
    }

    pub fn palette(uniforms: &ShaderUniforms) -> Palette {
        Palette {
            bias: uniforms.brightness,
            amplitude: CONTRAST,
            frequency: OSCILLATION,
            phase: PHASE,
        }
    }

    /// Purple bias added on top of the palette colour.
    pub fn bias(uniforms: &ShaderUniforms) -> Vec4 {
        Vec4::new(cap_upper(uniforms.deep_purple), 0.0, 0.5, cap_upper(uniforms.opacity))
    }

    /// Final RGBA for an interpolated `distortion`. Alpha carries the raw
    /// distortion plus the capped opacity; nothing is clamped to [0, 1] here.
    pub fn run(&self, distortion: f32, uniforms: &ShaderUniforms) -> Vec4 {
        let color = Self::palette(uniforms).eval(distortion * DISTORTION_GAIN);
        color.extend(distortion) + Self::bias(uniforms)
    }
}
