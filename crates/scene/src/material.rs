use glam::{Mat4, Vec4};
use morphsphere_common::{ShaderUniforms, UniformError, UniformName, UniformValue};
use morphsphere_shading::{ColorShader, DisplacementShader, VertexInput, VertexOutput};
use serde::{Deserialize, Serialize};

/// How stage output combines with the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    Normal,
    /// `src * src_alpha + dst`.
    #[default]
    Additive,
}

/// Mapping from uniform name to value with a key set fixed at construction.
///
/// Values are overwritten in place; keys can be neither inserted nor removed.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformStore {
    values: ShaderUniforms,
    revision: u64,
}

impl UniformStore {
    pub fn new(initial: ShaderUniforms) -> Self {
        Self {
            values: initial,
            revision: 0,
        }
    }

    /// The declared key set.
    pub fn keys(&self) -> [UniformName; 7] {
        UniformName::ALL
    }

    pub fn get(&self, name: UniformName) -> UniformValue {
        self.values.get(name)
    }

    /// Overwrite a single uniform by name.
    pub fn set(&mut self, name: UniformName, value: UniformValue) -> Result<(), UniformError> {
        self.values.set(name, value)?;
        self.revision += 1;
        Ok(())
    }

    /// Replace every value at once. Nothing of the previous set survives.
    pub fn write_all(&mut self, values: &ShaderUniforms) {
        self.values = *values;
        self.revision += 1;
    }

    pub fn values(&self) -> &ShaderUniforms {
        &self.values
    }

    /// Number of writes applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Vertex/pixel stage pair run by a material.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShaderProgram {
    pub vertex: DisplacementShader,
    pub fragment: ColorShader,
}

/// Shader program, uniform store and pipeline flags.
#[derive(Debug, Clone)]
pub struct Material {
    program: ShaderProgram,
    uniforms: UniformStore,
    pub blend: BlendMode,
    pub wireframe: bool,
}

impl Material {
    pub fn new(program: ShaderProgram, initial: ShaderUniforms) -> Self {
        Self {
            program,
            uniforms: UniformStore::new(initial),
            blend: BlendMode::Additive,
            wireframe: true,
        }
    }

    /// The displacement/palette material: additive wireframe with
    /// uniforms at their pre-sync values.
    pub fn displacement() -> Self {
        Self::new(ShaderProgram::default(), ShaderUniforms::material_initial())
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn uniforms(&self) -> &UniformStore {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformStore {
        &mut self.uniforms
    }

    /// Run the vertex stage with the current uniforms.
    pub fn shade_vertex(&self, vertex: &VertexInput, model_view_projection: Mat4) -> VertexOutput {
        self.program
            .vertex
            .run(vertex, self.uniforms.values(), model_view_projection)
    }

    /// Run the pixel stage with the current uniforms.
    pub fn shade_pixel(&self, distortion: f32) -> Vec4 {
        self.program.fragment.run(distortion, self.uniforms.values())
    }
}
