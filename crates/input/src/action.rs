use morphsphere_timeline::Playhead;

/// A high-level action that any input surface (keyboard, inspector panel)
/// can produce.
///
/// The host consumes actions, never raw input events, so keys and UI
/// buttons share one code path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Play if paused, pause if playing.
    TogglePlayback,
    /// Jump back to the start of the sequence.
    Rewind,
    /// Jump to a position in seconds.
    Seek(f32),
    /// Show or hide the inspector panel.
    ToggleInspector,
    /// Stop the render loop and close the window.
    Exit,
}

impl Action {
    /// Whether this action drives the playhead.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TogglePlayback | Self::Rewind | Self::Seek(_))
    }

    /// Apply a transport action to `playhead`. Returns `false` for actions
    /// the playhead does not handle.
    pub fn apply(&self, playhead: &mut Playhead) -> bool {
        match *self {
            Self::TogglePlayback => playhead.toggle(),
            Self::Rewind => playhead.rewind(),
            Self::Seek(position) => playhead.seek(position),
            Self::ToggleInspector | Self::Exit => return false,
        }
        tracing::debug!(
            action = ?self,
            position = playhead.position(),
            playing = playhead.is_playing(),
            "transport action"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_playback() {
        let mut playhead = Playhead::new(5.0);
        assert!(playhead.is_playing());
        assert!(Action::TogglePlayback.apply(&mut playhead));
        assert!(!playhead.is_playing());
    }

    #[test]
    fn seek_and_rewind_move_position() {
        let mut playhead = Playhead::new(5.0);
        Action::Seek(3.5).apply(&mut playhead);
        assert_eq!(playhead.position(), 3.5);
        Action::Rewind.apply(&mut playhead);
        assert_eq!(playhead.position(), 0.0);
    }

    #[test]
    fn non_transport_actions_are_ignored() {
        let mut playhead = Playhead::new(5.0);
        assert!(!Action::Exit.apply(&mut playhead));
        assert!(!Action::ToggleInspector.is_transport());
        assert!(Action::Seek(1.0).is_transport());
        assert!(playhead.is_playing());
    }
}
