use crate::types::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a shader uniform. The set is closed: every material declares
/// exactly these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UniformName {
    #[serde(rename = "uFrequency")]
    Frequency,
    #[serde(rename = "uAmplitude")]
    Amplitude,
    #[serde(rename = "uDensity")]
    Density,
    #[serde(rename = "uStrength")]
    Strength,
    #[serde(rename = "uDeepPurple")]
    DeepPurple,
    #[serde(rename = "uOpacity")]
    Opacity,
    #[serde(rename = "uBrightness")]
    Brightness,
}

impl UniformName {
    pub const ALL: [UniformName; 7] = [
        Self::Frequency,
        Self::Amplitude,
        Self::Density,
        Self::Strength,
        Self::DeepPurple,
        Self::Opacity,
        Self::Brightness,
    ];

    /// The key as it appears in shaders and track files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "uFrequency",
            Self::Amplitude => "uAmplitude",
            Self::Density => "uDensity",
            Self::Strength => "uStrength",
            Self::DeepPurple => "uDeepPurple",
            Self::Opacity => "uOpacity",
            Self::Brightness => "uBrightness",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == key)
    }

    pub fn kind(self) -> UniformKind {
        match self {
            Self::Brightness => UniformKind::Vec3,
            _ => UniformKind::Float,
        }
    }
}

impl fmt::Display for UniformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec3,
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => f.write_str("float"),
            Self::Vec3 => f.write_str("vec3"),
        }
    }
}

/// A uniform value: scalar float or three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Vec3(_) => UniformKind::Vec3,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Vec3(_) => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.3}"),
            Self::Vec3(v) => write!(f, "({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
        }
    }
}

/// Errors from name-based uniform writes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniformError {
    #[error("uniform {name} expects a {expected} value, got {found}")]
    TypeMismatch {
        name: UniformName,
        expected: UniformKind,
        found: UniformKind,
    },
}

/// The full uniform set consumed by both shader stages.
///
/// Being a struct rather than a map, every key is always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShaderUniforms {
    #[serde(rename = "uFrequency")]
    pub frequency: f32,
    #[serde(rename = "uAmplitude")]
    pub amplitude: f32,
    #[serde(rename = "uDensity")]
    pub density: f32,
    #[serde(rename = "uStrength")]
    pub strength: f32,
    #[serde(rename = "uDeepPurple")]
    pub deep_purple: f32,
    #[serde(rename = "uOpacity")]
    pub opacity: f32,
    #[serde(rename = "uBrightness")]
    pub brightness: Vec3,
}

/// Default brightness bias shared by the timeline defaults and material init.
pub const DEFAULT_BRIGHTNESS: Vec3 = Vec3::new(0.1, 0.1, 0.9);

impl Default for ShaderUniforms {
    /// Timeline defaults for a property with no track and no override.
    fn default() -> Self {
        Self {
            frequency: 0.0,
            amplitude: 4.0,
            density: 1.0,
            strength: 0.0,
            deep_purple: 1.0,
            opacity: 0.1,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl ShaderUniforms {
    /// Values a freshly constructed material holds before the first sync.
    pub fn material_initial() -> Self {
        Self {
            frequency: 0.0,
            amplitude: 0.0,
            density: 0.0,
            strength: 0.0,
            deep_purple: 0.0,
            opacity: 0.0,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    pub fn get(&self, name: UniformName) -> UniformValue {
        match name {
            UniformName::Frequency => UniformValue::Float(self.frequency),
            UniformName::Amplitude => UniformValue::Float(self.amplitude),
            UniformName::Density => UniformValue::Float(self.density),
            UniformName::Strength => UniformValue::Float(self.strength),
            UniformName::DeepPurple => UniformValue::Float(self.deep_purple),
            UniformName::Opacity => UniformValue::Float(self.opacity),
            UniformName::Brightness => UniformValue::Vec3(self.brightness),
        }
    }

    /// Overwrite one uniform. Fails only when the value kind does not match.
    pub fn set(&mut self, name: UniformName, value: UniformValue) -> Result<(), UniformError> {
        let mismatch = || UniformError::TypeMismatch {
            name,
            expected: name.kind(),
            found: value.kind(),
        };
        match name {
            UniformName::Brightness => {
                self.brightness = value.as_vec3().ok_or_else(mismatch)?;
            }
            _ => {
                let v = value.as_float().ok_or_else(mismatch)?;
                *self.scalar_mut(name).ok_or_else(mismatch)? = v;
            }
        }
        Ok(())
    }

    /// Mutable access to a scalar uniform; `None` for vector uniforms.
    pub fn scalar_mut(&mut self, name: UniformName) -> Option<&mut f32> {
        match name {
            UniformName::Frequency => Some(&mut self.frequency),
            UniformName::Amplitude => Some(&mut self.amplitude),
            UniformName::Density => Some(&mut self.density),
            UniformName::Strength => Some(&mut self.strength),
            UniformName::DeepPurple => Some(&mut self.deep_purple),
            UniformName::Opacity => Some(&mut self.opacity),
            UniformName::Brightness => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UniformName, UniformValue)> + '_ {
        UniformName::ALL.into_iter().map(|name| (name, self.get(name)))
    }
}

/// One tick's full set of externally driven values, consumed atomically.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub transforms: Transform,
    pub uniforms: ShaderUniforms,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_keys() {
        for name in UniformName::ALL {
            assert_eq!(UniformName::from_key(name.as_str()), Some(name));
        }
        assert_eq!(UniformName::from_key("uTime"), None);
    }

    #[test]
    fn defaults_match_declared_timeline_defaults() {
        let u = ShaderUniforms::default();
        assert_eq!(u.frequency, 0.0);
        assert_eq!(u.amplitude, 4.0);
        assert_eq!(u.density, 1.0);
        assert_eq!(u.strength, 0.0);
        assert_eq!(u.deep_purple, 1.0);
        assert_eq!(u.opacity, 0.1);
        assert_eq!(u.brightness, Vec3::new(0.1, 0.1, 0.9));
    }

    #[test]
    fn set_rejects_kind_mismatch() {
        let mut u = ShaderUniforms::default();
        let err = u
            .set(UniformName::Brightness, UniformValue::Float(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            UniformError::TypeMismatch {
                name: UniformName::Brightness,
                expected: UniformKind::Vec3,
                found: UniformKind::Float,
            }
        );
        assert!(u.set(UniformName::Opacity, UniformValue::Vec3(Vec3::ONE)).is_err());
        assert_eq!(u, ShaderUniforms::default());
    }

    #[test]
    fn set_overwrites_value() {
        let mut u = ShaderUniforms::default();
        u.set(UniformName::Frequency, UniformValue::Float(2.5)).unwrap();
        assert_eq!(u.get(UniformName::Frequency), UniformValue::Float(2.5));
    }

    #[test]
    fn iter_visits_every_key_once() {
        let u = ShaderUniforms::default();
        let names: Vec<UniformName> = u.iter().map(|(n, _)| n).collect();
        assert_eq!(names, UniformName::ALL.to_vec());
    }

    #[test]
    fn uniforms_serialize_with_shader_keys() {
        let json = serde_json::to_value(ShaderUniforms::default()).unwrap();
        assert_eq!(json["uAmplitude"], 4.0);
        assert!(json.get("uBrightness").is_some());
    }
}
