//! Timeline-driven parameter values.
//!
//! A [`ParameterChannel`] hands the render loop one complete
//! [`ParameterSnapshot`](morphsphere_common::ParameterSnapshot) per tick.
//! [`TimelineChannel`] evaluates a loaded project state at a [`Playhead`];
//! [`PushChannel`] receives snapshots from an evaluator running elsewhere.

pub mod channel;
pub mod keyframe;
pub mod playhead;
pub mod state;

pub use channel::{ParameterChannel, PushChannel, PushSender, StaticChannel, TimelineChannel};
pub use keyframe::{Keyframe, KeyframeKind, KeyframedTrack, UnitBezier};
pub use playhead::Playhead;
pub use state::{ObjectTimeline, ProjectState, PropPath, TrackError};
