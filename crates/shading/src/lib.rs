//! Shading core: periodic gradient noise, cosine palette, and CPU reference
//! implementations of the displacement (vertex) and colour (pixel) stages.
//!
//! # Invariants
//! - Every function here is total and pure: no hidden state, no errors.
//! - The GPU shaders in `morphsphere-render-wgpu` mirror these stages step for step.

pub mod color;
pub mod displacement;
pub mod noise;
pub mod palette;

pub use color::{ColorShader, cap_upper};
pub use displacement::{DisplacementShader, VertexInput, VertexOutput, rotation_y};
pub use noise::{DISPLACEMENT_PERIOD, NOISE_SCALE, NoiseField, pnoise};
pub use palette::{Palette, cosine_palette};
