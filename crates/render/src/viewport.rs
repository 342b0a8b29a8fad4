use crate::camera::PerspectiveCamera;
use glam::Vec3;
use morphsphere_scene::Mesh;

/// Drawable size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 while the height is zero (minimised window).
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.width < self.height
    }

    /// Shrink a physical size so it holds at most `max_pixel_ratio` device
    /// pixels per logical pixel. Below the cap the size is unchanged.
    pub fn capped_to_pixel_ratio(&self, scale_factor: f64, max_pixel_ratio: f32) -> Self {
        let max = f64::from(max_pixel_ratio);
        if max.is_nan() || max <= 0.0 || !scale_factor.is_finite() || scale_factor <= max {
            return *self;
        }
        let shrink = max / scale_factor;
        let scaled = |v: u32| ((f64::from(v) * shrink).round() as u32).max(1);
        Self::new(scaled(self.width), scaled(self.height))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Keeps the camera aspect in step with the viewport and applies the
/// portrait/landscape mesh scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportController {
    pub portrait_scale: f32,
    pub landscape_scale: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self {
            portrait_scale: 0.75,
            landscape_scale: 1.0,
        }
    }
}

impl ViewportController {
    pub fn new(portrait_scale: f32) -> Self {
        Self {
            portrait_scale,
            ..Self::default()
        }
    }

    /// Uniform mesh scale for a viewport. Binary: only the orientation
    /// matters, not the exact aspect.
    pub fn scale_for(&self, viewport: &Viewport) -> Vec3 {
        if viewport.is_portrait() {
            Vec3::splat(self.portrait_scale)
        } else {
            Vec3::splat(self.landscape_scale)
        }
    }

    /// Handle a resize: store the new size, update the projection, and
    /// overwrite the mesh scale.
    pub fn resize(
        &self,
        viewport: &mut Viewport,
        width: u32,
        height: u32,
        camera: &mut PerspectiveCamera,
        mesh: &mut Mesh,
    ) {
        *viewport = Viewport::new(width, height);
        camera.aspect = viewport.aspect();
        mesh.transform.scale = self.scale_for(viewport);
        tracing::debug!(
            width,
            height,
            aspect = camera.aspect,
            portrait = viewport.is_portrait(),
            "viewport resized"
        );
    }
}
