//! Shared types for the morphsphere renderer.
//!
//! # Invariants
//! - A `ShaderUniforms` value always carries every declared uniform key.
//! - A `ParameterSnapshot` is a full replacement, never a delta.

mod params;
mod types;

pub use params::{
    DEFAULT_BRIGHTNESS, ParameterSnapshot, ShaderUniforms, UniformError, UniformKind,
    UniformName, UniformValue,
};
pub use types::{Transform, TransformField, Vec3f};
