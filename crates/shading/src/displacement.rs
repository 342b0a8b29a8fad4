use crate::noise::{DISPLACEMENT_PERIOD, NoiseField};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use morphsphere_common::ShaderUniforms;

/// Per-vertex attributes read by the displacement stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInput {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Result of the displacement stage for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    /// Displaced and twisted object-space position.
    pub position: Vec3,
    pub clip_position: Vec4,
    /// Noise offset along the normal, passed to the colour stage.
    pub distortion: f32,
}

/// Rotation about +Y by `angle` radians.
pub fn rotation_y(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::from_cols(
        Vec3::new(c, 0.0, -s),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(s, 0.0, c),
    )
}

/// CPU reference of the vertex stage. The WGSL in the GPU backend performs
/// the same steps in the same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplacementShader {
    noise: NoiseField,
}

impl DisplacementShader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Noise offset along the normal for the given uniform set.
    pub fn distortion(&self, normal: Vec3, uniforms: &ShaderUniforms) -> f32 {
        self.noise
            .sample(normal * uniforms.density, DISPLACEMENT_PERIOD)
            * uniforms.strength
    }

    /// Twist angle about Y for a vertex at texture coordinate `v`.
    pub fn twist_angle(&self, v: f32, uniforms: &ShaderUniforms) -> f32 {
        (v * uniforms.frequency).sin() * uniforms.amplitude
    }

    /// Run the stage for one vertex. `model_view_projection` is
    /// `projection * view * model`.
    pub fn run(
        &self,
        vertex: &VertexInput,
        uniforms: &ShaderUniforms,
        model_view_projection: Mat4,
    ) -> VertexOutput {
        let distortion = self.distortion(vertex.normal, uniforms);
        let displaced = vertex.position + vertex.normal * distortion;
        let angle = self.twist_angle(vertex.uv.y, uniforms);
        let position = rotation_y(angle) * displaced;
        VertexOutput {
            position,
            clip_position: model_view_projection * position.extend(1.0),
            distortion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pole() -> VertexInput {
        VertexInput {
            position: Vec3::Y,
            normal: Vec3::Y,
            uv: Vec2::new(0.5, 1.0),
        }
    }

    #[test]
    fn zero_strength_leaves_vertex_in_place() {
        let shader = DisplacementShader::new();
        let uniforms = ShaderUniforms::default();
        let out = shader.run(&pole(), &uniforms, Mat4::IDENTITY);
        assert_eq!(out.distortion, 0.0);
        assert_eq!(out.position, Vec3::Y);
        assert_eq!(out.clip_position, Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn displacement_follows_normal() {
        let shader = DisplacementShader::new();
        let uniforms = ShaderUniforms {
            strength: 0.5,
            density: 1.37,
            amplitude: 0.0,
            ..ShaderUniforms::default()
        };
        let normal = Vec3::new(0.3, 0.5, 0.8).normalize();
        let vertex = VertexInput {
            position: normal,
            normal,
            uv: Vec2::new(0.2, 0.6),
        };
        let out = shader.run(&vertex, &uniforms, Mat4::IDENTITY);
        assert_ne!(out.distortion, 0.0);
        let offset = out.position - vertex.position;
        assert!(offset.normalize().dot(normal).abs() > 0.999);
        assert!((offset.length() - out.distortion.abs()).abs() < 1e-5);
    }

    #[test]
    fn twist_rotates_about_y() {
        let shader = DisplacementShader::new();
        let uniforms = ShaderUniforms {
            frequency: std::f32::consts::FRAC_PI_2,
            amplitude: std::f32::consts::FRAC_PI_2,
            ..ShaderUniforms::default()
        };
        let vertex = VertexInput {
            position: Vec3::X,
            normal: Vec3::X,
            uv: Vec2::new(0.0, 1.0),
        };
        let out = shader.run(&vertex, &uniforms, Mat4::IDENTITY);
        // angle = sin(pi/2) * pi/2 = pi/2: +X maps to -Z.
        assert!((out.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_matrix_matches_glam() {
        for angle in [-1.2_f32, 0.0, 0.4, 2.9] {
            let ours = rotation_y(angle);
            let theirs = Mat3::from_rotation_y(angle);
            assert!(ours.abs_diff_eq(theirs, 1e-6));
        }
    }

    #[test]
    fn clip_position_uses_supplied_matrix() {
        let shader = DisplacementShader::new();
        let mvp = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.5));
        let out = shader.run(&pole(), &ShaderUniforms::default(), mvp);
        assert_eq!(out.clip_position, Vec4::new(0.0, 1.0, -2.5, 1.0));
    }
}
