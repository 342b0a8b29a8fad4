use crate::camera::PerspectiveCamera;
use crate::renderer::Renderer;
use crate::viewport::{Viewport, ViewportController};
use morphsphere_scene::Mesh;
use morphsphere_timeline::ParameterChannel;

/// Loop lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// One mesh, one camera, one parameter source; one draw per host frame.
///
/// Built once at startup and driven by the host's frame callback through
/// [`RenderLoop::tick`]. Resize events go through [`RenderLoop::resize`].
#[derive(Debug)]
pub struct RenderLoop<C> {
    mesh: Mesh,
    camera: PerspectiveCamera,
    viewport: Viewport,
    controller: ViewportController,
    channel: C,
    state: LoopState,
    frames: u64,
}

impl<C: ParameterChannel> RenderLoop<C> {
    pub fn new(
        mesh: Mesh,
        camera: PerspectiveCamera,
        viewport: Viewport,
        controller: ViewportController,
        channel: C,
    ) -> Self {
        let mut render_loop = Self {
            mesh,
            camera,
            viewport,
            controller,
            channel,
            state: LoopState::Running,
            frames: 0,
        };
        render_loop.resize(viewport.width, viewport.height);
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            vertices = render_loop.mesh.geometry().vertex_count(),
            "render loop started"
        );
        render_loop
    }

    /// Run one frame: pull the snapshot, overwrite transform and uniforms,
    /// draw. Returns `None` once the loop is stopped.
    pub fn tick<R: Renderer>(&mut self, renderer: &mut R) -> Option<R::Output> {
        if self.state == LoopState::Stopped {
            return None;
        }
        let snapshot = self.channel.current_values();
        self.mesh.apply_snapshot(&snapshot);
        let output = renderer.draw(&self.mesh, &self.camera);
        self.frames += 1;
        Some(output)
    }

    /// Apply a new drawable size. The mesh scale written here holds until
    /// the next tick overwrites it from the channel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.controller.resize(
            &mut self.viewport,
            width,
            height,
            &mut self.camera,
            &mut self.mesh,
        );
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Stopped;
            tracing::info!(frames = self.frames, "render loop stopped");
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }
}
