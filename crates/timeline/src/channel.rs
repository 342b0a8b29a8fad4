use crate::playhead::Playhead;
use crate::state::{ObjectTimeline, ProjectState, TrackError};
use morphsphere_common::ParameterSnapshot;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Pull-based source of parameter values, queried once per render tick.
///
/// Every call returns a complete snapshot. Implementations must not block;
/// when nothing new is available they return the last snapshot again.
pub trait ParameterChannel {
    fn current_values(&mut self) -> ParameterSnapshot;
}

impl<C: ParameterChannel + ?Sized> ParameterChannel for Box<C> {
    fn current_values(&mut self) -> ParameterSnapshot {
        (**self).current_values()
    }
}

/// Always delivers the same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticChannel {
    snapshot: ParameterSnapshot,
}

impl StaticChannel {
    pub fn new(snapshot: ParameterSnapshot) -> Self {
        Self { snapshot }
    }
}

impl ParameterChannel for StaticChannel {
    fn current_values(&mut self) -> ParameterSnapshot {
        self.snapshot
    }
}

/// Sending half of a [`PushChannel`], held by whatever evaluates the timeline
/// elsewhere.
#[derive(Debug, Clone)]
pub struct PushSender {
    tx: Sender<ParameterSnapshot>,
}

impl PushSender {
    /// Returns `false` once the receiving channel is gone.
    pub fn push(&self, snapshot: ParameterSnapshot) -> bool {
        self.tx.send(snapshot).is_ok()
    }
}

/// Receives snapshots pushed by an external evaluator.
#[derive(Debug)]
pub struct PushChannel {
    rx: Receiver<ParameterSnapshot>,
    last: ParameterSnapshot,
    disconnected: bool,
}

impl PushChannel {
    pub fn new(initial: ParameterSnapshot) -> (PushSender, Self) {
        let (tx, rx) = mpsc::channel();
        let channel = Self {
            rx,
            last: initial,
            disconnected: false,
        };
        (PushSender { tx }, channel)
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl ParameterChannel for PushChannel {
    fn current_values(&mut self) -> ParameterSnapshot {
        // Drain everything pending; only the newest snapshot matters.
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => self.last = snapshot,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        tracing::debug!("push channel sender dropped; holding last values");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        self.last
    }
}

/// Evaluates a loaded timeline at its playhead.
#[derive(Debug, Clone)]
pub struct TimelineChannel {
    timeline: ObjectTimeline,
    playhead: Playhead,
    cached: ParameterSnapshot,
    evaluated_at: Option<f32>,
}

impl TimelineChannel {
    pub fn new(timeline: ObjectTimeline) -> Self {
        let playhead = Playhead::new(timeline.length());
        let cached = *timeline.base();
        Self {
            timeline,
            playhead,
            cached,
            evaluated_at: None,
        }
    }

    /// Load `path` and bind the channel to `object` on `sheet`.
    pub fn from_file(
        path: impl AsRef<Path>,
        sheet: &str,
        object: &str,
    ) -> Result<Self, TrackError> {
        let state = ProjectState::load(path)?;
        Ok(Self::new(state.object_timeline(sheet, object)?))
    }

    pub fn timeline(&self) -> &ObjectTimeline {
        &self.timeline
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    /// Advance the playhead by one frame's worth of seconds.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.playhead.advance(dt)
    }
}

impl ParameterChannel for TimelineChannel {
    fn current_values(&mut self) -> ParameterSnapshot {
        let position = self.playhead.position();
        if self.evaluated_at != Some(position) {
            self.cached = self.timeline.evaluate(position);
            self.evaluated_at = Some(position);
        }
        self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{Keyframe, KeyframedTrack};
    use crate::state::PropPath;
    use morphsphere_common::{ShaderUniforms, UniformName};

    fn linear(v0: f32, v1: f32, length: f32) -> KeyframedTrack {
        let mut a = Keyframe::new(0.0, v0);
        a.handles = [0.0, 0.0, 1.0 / 3.0, 1.0 / 3.0];
        let mut b = Keyframe::new(length, v1);
        b.handles = [2.0 / 3.0, 2.0 / 3.0, 0.0, 0.0];
        KeyframedTrack::new(vec![a, b])
    }

    #[test]
    fn static_channel_repeats() {
        let mut channel = StaticChannel::default();
        assert_eq!(channel.current_values(), ParameterSnapshot::default());
        assert_eq!(channel.current_values(), ParameterSnapshot::default());
    }

    #[test]
    fn boxed_channel_delegates() {
        let snapshot = ParameterSnapshot {
            uniforms: ShaderUniforms {
                density: 3.0,
                ..ShaderUniforms::default()
            },
            ..ParameterSnapshot::default()
        };
        let mut channel: Box<dyn ParameterChannel> = Box::new(StaticChannel::new(snapshot));
        assert_eq!(channel.current_values().uniforms.density, 3.0);
    }

    #[test]
    fn push_channel_keeps_newest_and_redelivers() {
        let (tx, mut channel) = PushChannel::new(ParameterSnapshot::default());
        assert_eq!(channel.current_values(), ParameterSnapshot::default());

        for frequency in [1.0, 2.0, 2.5] {
            let mut snapshot = ParameterSnapshot::default();
            snapshot.uniforms.frequency = frequency;
            assert!(tx.push(snapshot));
        }
        assert_eq!(channel.current_values().uniforms.frequency, 2.5);
        assert_eq!(channel.current_values().uniforms.frequency, 2.5);

        drop(tx);
        assert_eq!(channel.current_values().uniforms.frequency, 2.5);
        assert!(channel.is_disconnected());
    }

    #[test]
    fn push_sender_reports_closed_channel() {
        let (tx, channel) = PushChannel::new(ParameterSnapshot::default());
        drop(channel);
        assert!(!tx.push(ParameterSnapshot::default()));
    }

    #[test]
    fn timeline_channel_follows_playhead() {
        let timeline = ObjectTimeline::constant(ParameterSnapshot::default())
            .with_track(PropPath::Uniform(UniformName::Frequency), linear(0.0, 4.0, 2.0));
        let mut channel = TimelineChannel::new(timeline);
        assert_eq!(channel.playhead().length(), 2.0);

        assert_eq!(channel.current_values().uniforms.frequency, 0.0);
        channel.advance(0.5);
        let v = channel.current_values().uniforms.frequency;
        assert!((v - 1.0).abs() < 1e-3, "got {v}");

        channel.playhead_mut().pause();
        channel.advance(0.5);
        let again = channel.current_values().uniforms.frequency;
        assert_eq!(v, again);
    }

    #[test]
    fn timeline_channel_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"sheetsById":{"Scene":{"sequence":{"length":3,"tracksByObject":{"Shader":{
                "trackIdByPropPath":{"[\"uniforms\",\"uOpacity\"]":"op"},
                "trackData":{"op":{"keyframes":[{"position":0,"value":0.5},{"position":3,"value":0.5}]}}
            }}}}}}"#,
        )
        .unwrap();
        let mut channel = TimelineChannel::from_file(&path, "Scene", "Shader").unwrap();
        assert_eq!(channel.playhead().length(), 3.0);
        assert_eq!(channel.current_values().uniforms.opacity, 0.5);
    }
}
