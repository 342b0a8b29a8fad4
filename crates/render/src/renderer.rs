use crate::camera::PerspectiveCamera;
use morphsphere_scene::Mesh;
use std::fmt::Write;

/// Renderer-agnostic draw interface. All renderers implement this trait.
///
/// A renderer reads the mesh (geometry, transform, uniforms) and the camera,
/// then produces one frame. It never writes back into the mesh.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Draw one frame.
    fn draw(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Reports the transform, every uniform, and the vertex stage evaluated at
/// the mesh's north pole.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn draw(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        let geometry = mesh.geometry();
        let t = &mesh.transform;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "=== Frame {} ({} vertices, {} triangles) ===",
            self.frames,
            geometry.vertex_count(),
            geometry.triangle_count()
        );
        let _ = writeln!(
            out,
            "transform: pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            t.position.x,
            t.position.y,
            t.position.z,
            t.rotation.x,
            t.rotation.y,
            t.rotation.z,
            t.scale.x,
            t.scale.y,
            t.scale.z
        );
        for (name, value) in mesh.material().uniforms().values().iter() {
            let _ = writeln!(out, "  {name} = {value}");
        }

        if let Some(vertex) = geometry.north_pole().and_then(|i| geometry.vertex(i)) {
            let mvp = camera.model_view_projection(t.model_matrix());
            let shaded = mesh.material().shade_vertex(&vertex, mvp);
            let colour = mesh.material().shade_pixel(shaded.distortion);
            let _ = writeln!(
                out,
                "pole: distortion={:.4} rgba=({:.3}, {:.3}, {:.3}, {:.3})",
                shaded.distortion, colour.x, colour.y, colour.z, colour.w
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphsphere_common::ParameterSnapshot;
    use morphsphere_scene::{Geometry, Material};
    use std::sync::Arc;

    #[test]
    fn reports_frame_and_uniforms() {
        let mut mesh = Mesh::new(Arc::new(Geometry::icosphere(1.0, 1)), Material::displacement());
        mesh.apply_snapshot(&ParameterSnapshot::default());
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.draw(&mesh, &PerspectiveCamera::default());

        assert!(output.contains("Frame 1"));
        assert!(output.contains("uAmplitude = 4.000"));
        assert!(output.contains("pole: distortion="));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn counts_frames() {
        let mesh = Mesh::new(Arc::new(Geometry::icosphere(1.0, 0)), Material::displacement());
        let mut renderer = DebugTextRenderer::new();
        let camera = PerspectiveCamera::default();
        renderer.draw(&mesh, &camera);
        let second = renderer.draw(&mesh, &camera);
        assert!(second.contains("Frame 2"));
    }
}
