//! Developer tooling: loop inspector, playback summary, CPU profiling of the
//! shader stages.
//!
//! # Invariants
//! - Tools only read loop and mesh state.

pub mod inspector;
pub mod profile;

pub use inspector::{FrameSummary, LoopInspector, PlaybackInfo};
pub use profile::{DisplacementProfile, Range};
