use glam::{Mat4, Vec4};
use morphsphere_scene::Mesh;
use std::time::{Duration, Instant};

/// Closed range of observed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    fn empty() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    fn include(&mut self, v: f32) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn span(&self) -> f32 {
        (self.max - self.min).max(0.0)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.min, self.max)
    }
}

/// What both shader stages produce over every vertex of a mesh, run on the
/// CPU with the mesh's current uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementProfile {
    pub vertices: usize,
    pub distortion: Range,
    pub mean_distortion: f32,
    /// Per-channel ranges of the pixel stage output, evaluated at each
    /// vertex's distortion.
    pub red: Range,
    pub green: Range,
    pub blue: Range,
    pub alpha: Range,
    pub elapsed: Duration,
}

impl DisplacementProfile {
    /// Run the vertex and pixel stages over `mesh`. `view_proj` is applied
    /// after the mesh's own model matrix.
    pub fn measure(mesh: &Mesh, view_proj: Mat4) -> Self {
        let start = Instant::now();
        let mvp = view_proj * mesh.transform.model_matrix();
        let material = mesh.material();

        let mut distortion = Range::empty();
        let mut channels = [Range::empty(); 4];
        let mut sum = 0.0_f64;
        let mut count = 0usize;

        for vertex in mesh.geometry().vertices() {
            let out = material.shade_vertex(&vertex, mvp);
            distortion.include(out.distortion);
            sum += f64::from(out.distortion);
            count += 1;

            let rgba: Vec4 = material.shade_pixel(out.distortion);
            for (range, v) in channels.iter_mut().zip(rgba.to_array()) {
                range.include(v);
            }
        }

        let [red, green, blue, alpha] = channels;
        let profile = Self {
            vertices: count,
            distortion,
            mean_distortion: if count == 0 { 0.0 } else { (sum / count as f64) as f32 },
            red,
            green,
            blue,
            alpha,
            elapsed: start.elapsed(),
        };
        tracing::debug!(
            vertices = profile.vertices,
            elapsed = ?profile.elapsed,
            "displacement profile measured"
        );
        profile
    }
}

impl std::fmt::Display for DisplacementProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "vertices:   {}", self.vertices)?;
        writeln!(
            f,
            "distortion: {} mean={:.4}",
            self.distortion, self.mean_distortion
        )?;
        writeln!(f, "red:        {}", self.red)?;
        writeln!(f, "green:      {}", self.green)?;
        writeln!(f, "blue:       {}", self.blue)?;
        writeln!(f, "alpha:      {}", self.alpha)?;
        write!(f, "elapsed:    {:?}", self.elapsed)
    }
}
