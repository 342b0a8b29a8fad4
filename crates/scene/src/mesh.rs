use crate::geometry::Geometry;
use crate::material::Material;
use morphsphere_common::{ParameterSnapshot, Transform};
use std::sync::Arc;

/// Geometry, transform and the material it exclusively owns.
///
/// Geometry is shared read-only; the transform and the material's uniform
/// values change every tick.
#[derive(Debug, Clone)]
pub struct Mesh {
    geometry: Arc<Geometry>,
    pub transform: Transform,
    material: Material,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            geometry,
            transform: Transform::default(),
            material,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Overwrite the transform and every uniform from one snapshot. No
    /// smoothing: the previous values are discarded.
    pub fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot) {
        self.transform = snapshot.transforms;
        self.material.uniforms_mut().write_all(&snapshot.uniforms);
    }
}
