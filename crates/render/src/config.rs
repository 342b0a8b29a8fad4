use crate::camera::PerspectiveCamera;
use crate::viewport::ViewportController;
use glam::Vec3;
use morphsphere_scene::{BlendMode, Geometry, Material, Mesh};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Errors from loading or saving render settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported settings file extension: {0}")]
    UnsupportedExtension(String),
}

/// Startup settings for the mesh, camera and viewport policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub radius: f32,
    /// Icosphere subdivision level.
    pub detail: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_distance: f32,
    /// RGBA; transparent by default.
    pub clear_color: [f32; 4],
    pub wireframe: bool,
    /// `additive` or `normal`.
    pub blend: BlendMode,
    pub portrait_scale: f32,
    /// Device pixels per logical pixel are capped at this on dense displays.
    pub max_pixel_ratio: f32,
    /// MSAA sample count; 1 disables it.
    pub msaa_samples: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            radius: 1.0,
            detail: 64,
            fov_degrees: 75.0,
            near: 0.1,
            far: 10.0,
            camera_distance: 2.5,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            wireframe: true,
            blend: BlendMode::Additive,
            portrait_scale: 0.75,
            max_pixel_ratio: 1.5,
            msaa_samples: 4,
        }
    }
}

enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml" | "yml") => Ok(Format::Yaml),
        other => Err(ConfigError::UnsupportedExtension(
            other.unwrap_or_default().to_string(),
        )),
    }
}

impl RenderSettings {
    /// Load from a `.json`, `.yaml` or `.yml` file. Missing fields take
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let file = std::fs::File::open(path)?;
        let settings = match format {
            Format::Json => serde_json::from_reader(file)?,
            Format::Yaml => serde_yaml::from_reader(file)?,
        };
        tracing::debug!(path = %path.display(), "render settings loaded");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let file = std::fs::File::create(path)?;
        match format {
            Format::Json => serde_json::to_writer_pretty(file, self)?,
            Format::Yaml => serde_yaml::to_writer(file, self)?,
        }
        Ok(())
    }

    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera {
            position: Vec3::new(0.0, 0.0, self.camera_distance),
            fov: self.fov_degrees.to_radians(),
            near: self.near,
            far: self.far,
            ..PerspectiveCamera::default()
        }
    }

    pub fn viewport_controller(&self) -> ViewportController {
        ViewportController::new(self.portrait_scale)
    }

    /// Icosphere with the displacement material.
    pub fn build_mesh(&self) -> Mesh {
        let mut material = Material::displacement();
        material.wireframe = self.wireframe;
        material.blend = self.blend;
        Mesh::new(Arc::new(Geometry::icosphere(self.radius, self.detail)), material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_setup() {
        let settings = RenderSettings::default();
        let camera = settings.camera();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 2.5));
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 10.0);
        assert_eq!(settings.viewport_controller().portrait_scale, 0.75);
        assert_eq!(settings.max_pixel_ratio, 1.5);
        assert_eq!(settings.msaa_samples, 4);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "detail: 8\nwireframe: false\n").unwrap();
        let settings = RenderSettings::load(&path).unwrap();
        assert_eq!(settings.detail, 8);
        assert!(!settings.wireframe);
        assert_eq!(settings.fov_degrees, 75.0);

        let mesh = settings.build_mesh();
        assert!(!mesh.material().wireframe);
        assert_eq!(mesh.geometry().triangle_count(), 20 * 81);
    }

    #[test]
    fn blend_mode_reaches_the_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        std::fs::write(&path, "blend: normal\n").unwrap();
        let settings = RenderSettings::load(&path).unwrap();
        assert_eq!(settings.blend, BlendMode::Normal);
        assert_eq!(settings.build_mesh().material().blend, BlendMode::Normal);
        assert_eq!(
            RenderSettings::default().build_mesh().material().blend,
            BlendMode::Additive
        );
    }

    #[test]
    fn json_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = RenderSettings {
            radius: 1.5,
            clear_color: [0.1, 0.0, 0.2, 1.0],
            ..RenderSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(RenderSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = RenderSettings::load("settings.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedExtension(ext) if ext == "toml"));
    }
}
