use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Three-component float vector used for positions, normals, Euler angles,
/// scale factors and colours.
pub type Vec3f = Vec3;

/// Spatial transform: position, rotation (Euler XYZ, radians), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Object-to-world matrix, composed as `T * Rx * Ry * Rz * S`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(self.scale)
    }

    pub fn get(&self, field: TransformField) -> Vec3 {
        match field {
            TransformField::Position => self.position,
            TransformField::Rotation => self.rotation,
            TransformField::Scale => self.scale,
        }
    }

    pub fn field_mut(&mut self, field: TransformField) -> &mut Vec3 {
        match field {
            TransformField::Position => &mut self.position,
            TransformField::Rotation => &mut self.rotation,
            TransformField::Scale => &mut self.scale,
        }
    }
}

/// The three driven transform vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformField {
    Position,
    Rotation,
    Scale,
}

impl TransformField {
    pub const ALL: [TransformField; 3] = [Self::Position, Self::Rotation, Self::Scale];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_matrix_applies_scale_then_translation() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            ..Transform::default()
        };
        let p = t.model_matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn model_matrix_rotates_about_y() {
        let t = Transform {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Transform::default()
        };
        let p = t.model_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn field_access_round_trips() {
        let mut t = Transform::default();
        *t.field_mut(TransformField::Rotation) = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(t.get(TransformField::Rotation), Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(TransformField::from_key("scale"), Some(TransformField::Scale));
        assert_eq!(TransformField::from_key("skew"), None);
    }
}
