//! Renderer-agnostic frame loop.
//!
//! # Invariants
//! - A renderer reads the mesh and camera; it never writes them.
//! - Each tick overwrites the whole transform and uniform set from one
//!   snapshot. Nothing carries over from the previous tick.
//! - Viewport scale writes land before the next tick's channel write, so
//!   the channel value wins within that tick.
//!
//! [`DebugTextRenderer`] serves headless runs; the GPU backend implements
//! the same [`Renderer`] trait.

mod camera;
mod config;
mod render_loop;
mod renderer;
mod viewport;

pub use camera::PerspectiveCamera;
pub use config::{ConfigError, RenderSettings};
pub use render_loop::{LoopState, RenderLoop};
pub use renderer::{DebugTextRenderer, Renderer};
pub use viewport::{Viewport, ViewportController};
