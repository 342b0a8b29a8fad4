use morphsphere_common::{Transform, TransformField};
use morphsphere_render::{LoopState, RenderLoop, Viewport};
use morphsphere_scene::Mesh;
use morphsphere_timeline::{ParameterChannel, Playhead};

/// Render loop inspector for developer tooling.
///
/// Read-only queries against the loop for the inspector panel and CLI.
pub struct LoopInspector;

impl LoopInspector {
    /// Produce a summary of the loop state.
    pub fn summary<C: ParameterChannel>(render_loop: &RenderLoop<C>) -> FrameSummary {
        let mesh = render_loop.mesh();
        FrameSummary {
            state: render_loop.state(),
            frames: render_loop.frames(),
            viewport: render_loop.viewport(),
            aspect: render_loop.camera().aspect,
            vertices: mesh.geometry().vertex_count(),
            wireframe: mesh.material().wireframe,
            uniform_revision: mesh.material().uniforms().revision(),
        }
    }

    /// Uniform name and formatted value, in declaration order.
    pub fn uniform_rows(mesh: &Mesh) -> Vec<(&'static str, String)> {
        mesh.material()
            .uniforms()
            .values()
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_string()))
            .collect()
    }

    /// Transform field name and formatted value.
    pub fn transform_rows(transform: &Transform) -> Vec<(&'static str, String)> {
        TransformField::ALL
            .iter()
            .map(|&field| {
                let v = transform.get(field);
                (field.as_str(), format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z))
            })
            .collect()
    }

    pub fn playback(playhead: &Playhead) -> PlaybackInfo {
        PlaybackInfo {
            position: playhead.position(),
            length: playhead.length(),
            playing: playhead.is_playing(),
            looping: playhead.looping,
            rate: playhead.rate,
        }
    }
}

/// Summary of loop state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub state: LoopState,
    pub frames: u64,
    pub viewport: Viewport,
    pub aspect: f32,
    pub vertices: usize,
    pub wireframe: bool,
    pub uniform_revision: u64,
}

impl std::fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loop: state={:?} frames={} viewport={}x{} aspect={:.3} vertices={}",
            self.state,
            self.frames,
            self.viewport.width,
            self.viewport.height,
            self.aspect,
            self.vertices
        )
    }
}

/// Transport state of a playhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackInfo {
    pub position: f32,
    pub length: f32,
    pub playing: bool,
    pub looping: bool,
    pub rate: f32,
}

impl std::fmt::Display for PlaybackInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2}s / {:.2}s {}",
            self.position,
            self.length,
            if self.playing { "playing" } else { "paused" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphsphere_render::{DebugTextRenderer, PerspectiveCamera, ViewportController};
    use morphsphere_scene::{Geometry, Material};
    use morphsphere_timeline::StaticChannel;
    use std::sync::Arc;

    fn render_loop() -> RenderLoop<StaticChannel> {
        RenderLoop::new(
            Mesh::new(Arc::new(Geometry::icosphere(1.0, 0)), Material::displacement()),
            PerspectiveCamera::default(),
            Viewport::new(800, 600),
            ViewportController::default(),
            StaticChannel::default(),
        )
    }

    #[test]
    fn summary_tracks_frames() {
        let mut rl = render_loop();
        let before = LoopInspector::summary(&rl);
        assert_eq!(before.frames, 0);
        assert_eq!(before.state, LoopState::Running);
        assert_eq!(before.vertices, 60);

        rl.tick(&mut DebugTextRenderer::new());
        let after = LoopInspector::summary(&rl);
        assert_eq!(after.frames, 1);
        assert!(after.uniform_revision > before.uniform_revision);
    }

    #[test]
    fn uniform_rows_list_every_key() {
        let rl = render_loop();
        let rows = LoopInspector::uniform_rows(rl.mesh());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].0, "uFrequency");
        assert!(rows.iter().any(|(name, _)| *name == "uBrightness"));
    }

    #[test]
    fn transform_rows_format_vectors() {
        let rows = LoopInspector::transform_rows(&Transform::default());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().any(|(_, v)| v == "(1.000, 1.000, 1.000)"));
    }

    #[test]
    fn playback_display() {
        let mut playhead = Playhead::new(4.0);
        playhead.seek(1.5);
        playhead.pause();
        let info = LoopInspector::playback(&playhead);
        assert_eq!(format!("{info}"), "1.50s / 4.00s paused");
    }

    #[test]
    fn summary_display() {
        let rl = render_loop();
        let s = format!("{}", LoopInspector::summary(&rl));
        assert!(s.contains("frames=0"));
        assert!(s.contains("800x600"));
    }
}
