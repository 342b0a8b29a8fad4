//! wgpu backend for the displaced sphere.
//!
//! Uploads the icosphere once and draws it as a line list (wireframe) or
//! triangle list, additively blended by default, optionally multisampled.
//! Both shader stages are WGSL
//! ports of the CPU stages in `morphsphere-shading`.
//!
//! # Invariants
//! - The renderer never mutates the mesh or its uniforms.
//! - One uniform write and one draw call per frame.

mod gpu;
mod shaders;

pub use gpu::{ADDITIVE_BLEND, GpuFrame, GpuUniforms, WgpuRenderer, supported_sample_count};
pub use shaders::MORPH_SHADER;
