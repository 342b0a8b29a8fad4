//! Input actions shared by the keyboard and the inspector panel.
//!
//! # Invariants
//! - Keyboard and UI produce the same [`Action`] values.
//! - Only transport actions touch the playhead.

pub mod action;

pub use action::Action;
