//! Render state: the icosphere geometry, the mesh transform, and the
//! material with its fixed-key uniform store.
//!
//! # Invariants
//! - Geometry is immutable after construction.
//! - A mesh exclusively owns its material; a material exclusively owns its
//!   uniform store.
//! - The uniform key set never changes after the material is built.

pub mod geometry;
pub mod material;
pub mod mesh;

pub use geometry::{Geometry, sphere_uv};
pub use material::{BlendMode, Material, ShaderProgram, UniformStore};
pub use mesh::Mesh;
