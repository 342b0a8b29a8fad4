use glam::{Mat4, Vec3};

/// Fixed perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.5),
            target: Vec3::ZERO,
            fov: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 10.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Clip transform for an object placed by `model`.
    pub fn model_view_projection(&self, model: Mat4) -> Mat4 {
        self.view_projection() * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 2.5));
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.fov.to_degrees() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn aspect_stretches_horizontal_scale() {
        let mut cam = PerspectiveCamera::default();
        let square = cam.projection_matrix().col(0).x;
        cam.aspect = 2.0;
        let wide = cam.projection_matrix().col(0).x;
        assert!((square / wide - 2.0).abs() < 1e-5);
    }
}
