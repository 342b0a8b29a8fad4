//! Timeline project-state files.
//!
//! The file is a JSON (or YAML) document of the form:
//! ```text
//! sheetsById.<sheet>
//!   staticOverrides.byObject.<object>     - nested value tree
//!   sequence
//!     length                             - seconds
//!     subUnitsPerUnit                    - frame snapping, informational
//!     tracksByObject.<object>
//!       trackIdByPropPath                - "[\"uniforms\",\"uFrequency\"]" -> track id
//!       trackData.<track id>.keyframes[] - position / value / handles / connectedRight
//! ```
//! Only numeric leaves are read. Anything else in the document is ignored.

use crate::keyframe::{Keyframe, KeyframedTrack};
use morphsphere_common::{ParameterSnapshot, TransformField, UniformKind, UniformName};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Errors from loading or resolving a project state.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("sheet not found: {0}")]
    MissingSheet(String),
    #[error("malformed property path: {0}")]
    InvalidPropPath(String),
    #[error("expected a number at {0}")]
    NonNumeric(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default)]
    pub sheets_by_id: BTreeMap<String, SheetState>,
    #[serde(default)]
    pub definition_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetState {
    #[serde(default)]
    pub static_overrides: StaticOverrides,
    #[serde(default)]
    pub sequence: Option<SequenceState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticOverrides {
    #[serde(default)]
    pub by_object: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceState {
    #[serde(default)]
    pub length: f32,
    #[serde(default)]
    pub sub_units_per_unit: Option<u32>,
    #[serde(default)]
    pub tracks_by_object: BTreeMap<String, ObjectTracks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTracks {
    #[serde(default)]
    pub track_id_by_prop_path: BTreeMap<String, String>,
    #[serde(default)]
    pub track_data: BTreeMap<String, TrackData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackData {
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

/// A numeric leaf of the parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropPath {
    Uniform(UniformName),
    UniformComponent(UniformName, usize),
    Transform(TransformField, usize),
}

fn axis_index(key: &str) -> Option<usize> {
    match key {
        "x" => Some(0),
        "y" => Some(1),
        "z" => Some(2),
        _ => None,
    }
}

impl PropPath {
    /// Resolve path segments such as `["uniforms", "uBrightness", "x"]`.
    /// `None` when the path names nothing this renderer drives.
    pub fn from_segments(segments: &[&str]) -> Option<Self> {
        match segments {
            ["uniforms", name] => {
                let name = UniformName::from_key(name)?;
                (name.kind() == UniformKind::Float).then_some(Self::Uniform(name))
            }
            ["uniforms", name, axis] => {
                let name = UniformName::from_key(name)?;
                (name.kind() == UniformKind::Vec3)
                    .then_some(())
                    .and(axis_index(axis))
                    .map(|axis| Self::UniformComponent(name, axis))
            }
            ["transforms", field, axis] => {
                Some(Self::Transform(TransformField::from_key(field)?, axis_index(axis)?))
            }
            _ => None,
        }
    }

    /// Parse the JSON-encoded array form used as a map key in the state file.
    pub fn parse(encoded: &str) -> Result<Option<Self>, TrackError> {
        let segments: Vec<String> = serde_json::from_str(encoded)
            .map_err(|_| TrackError::InvalidPropPath(encoded.to_string()))?;
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        Ok(Self::from_segments(&refs))
    }

    pub fn write(&self, snapshot: &mut ParameterSnapshot, value: f32) {
        match *self {
            Self::Uniform(name) => {
                if let Some(slot) = snapshot.uniforms.scalar_mut(name) {
                    *slot = value;
                }
            }
            Self::UniformComponent(_, axis) => {
                // Brightness is the only vector uniform.
                snapshot.uniforms.brightness[axis] = value;
            }
            Self::Transform(field, axis) => {
                snapshot.transforms.field_mut(field)[axis] = value;
            }
        }
    }
}

/// Everything needed to evaluate one sheet object over time.
#[derive(Debug, Clone, Default)]
pub struct ObjectTimeline {
    length: f32,
    base: ParameterSnapshot,
    tracks: Vec<(PropPath, KeyframedTrack)>,
}

impl ObjectTimeline {
    /// A timeline with no tracks: always evaluates to `base`.
    pub fn constant(base: ParameterSnapshot) -> Self {
        Self {
            length: 0.0,
            base,
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, path: PropPath, track: KeyframedTrack) -> Self {
        let end = track.keyframes().last().map_or(0.0, |k| k.position);
        self.length = self.length.max(end);
        self.tracks.push((path, track));
        self
    }

    /// Sequence length in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Defaults overlaid with static overrides.
    pub fn base(&self) -> &ParameterSnapshot {
        &self.base
    }

    /// Full snapshot at `position` seconds.
    pub fn evaluate(&self, position: f32) -> ParameterSnapshot {
        let mut snapshot = self.base;
        for (path, track) in &self.tracks {
            if let Some(value) = track.value_at(position) {
                path.write(&mut snapshot, value);
            }
        }
        snapshot
    }
}

impl ProjectState {
    pub fn from_json_str(text: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, TrackError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from disk; `.yaml`/`.yml` files are read as YAML, everything else
    /// as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Resolve one object of one sheet into an evaluable timeline.
    pub fn object_timeline(&self, sheet: &str, object: &str) -> Result<ObjectTimeline, TrackError> {
        let sheet_state = self
            .sheets_by_id
            .get(sheet)
            .ok_or_else(|| TrackError::MissingSheet(sheet.to_string()))?;

        let mut base = ParameterSnapshot::default();
        if let Some(overrides) = sheet_state.static_overrides.by_object.get(object) {
            apply_overrides(&mut base, overrides, &mut Vec::new())?;
        }

        let mut timeline = ObjectTimeline::constant(base);
        let Some(sequence) = &sheet_state.sequence else {
            tracing::debug!(sheet, object, "sheet has no sequence");
            return Ok(timeline);
        };
        timeline.length = sequence.length.max(0.0);

        let Some(tracks) = sequence.tracks_by_object.get(object) else {
            tracing::warn!(sheet, object, "object has no tracks; using static values");
            return Ok(timeline);
        };
        for (encoded, track_id) in &tracks.track_id_by_prop_path {
            let Some(path) = PropPath::parse(encoded)? else {
                tracing::warn!(path = %encoded, "ignoring track for unknown property");
                continue;
            };
            let Some(data) = tracks.track_data.get(track_id) else {
                tracing::warn!(path = %encoded, track_id, "track id has no data");
                continue;
            };
            timeline = timeline.with_track(path, KeyframedTrack::new(data.keyframes.clone()));
        }

        tracing::info!(
            sheet,
            object,
            tracks = timeline.track_count(),
            length = timeline.length(),
            "timeline resolved"
        );
        Ok(timeline)
    }
}

/// Walk a static-override value tree, writing every numeric leaf that maps
/// onto a known property.
fn apply_overrides(
    snapshot: &mut ParameterSnapshot,
    value: &Value,
    prefix: &mut Vec<String>,
) -> Result<(), TrackError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(key.clone());
                apply_overrides(snapshot, child, prefix)?;
                prefix.pop();
            }
            Ok(())
        }
        _ => {
            let segments: Vec<&str> = prefix.iter().map(String::as_str).collect();
            let Some(path) = PropPath::from_segments(&segments) else {
                tracing::warn!(path = ?segments, "ignoring override for unknown property");
                return Ok(());
            };
            let number = value
                .as_f64()
                .ok_or_else(|| TrackError::NonNumeric(segments.join(".")))?;
            path.write(snapshot, number as f32);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use morphsphere_common::ShaderUniforms;

    const STATE: &str = r#"{
        "sheetsById": {
            "Scene": {
                "staticOverrides": {
                    "byObject": {
                        "Shader": {
                            "uniforms": { "uDensity": 2.5, "uBrightness": { "z": 0.4 } },
                            "transforms": { "scale": { "y": 1.5 } }
                        }
                    }
                },
                "sequence": {
                    "type": "PositionalSequence",
                    "length": 10,
                    "subUnitsPerUnit": 30,
                    "tracksByObject": {
                        "Shader": {
                            "trackIdByPropPath": {
                                "[\"uniforms\",\"uStrength\"]": "t1",
                                "[\"transforms\",\"rotation\",\"y\"]": "t2",
                                "[\"uniforms\",\"uTime\"]": "t3"
                            },
                            "trackData": {
                                "t1": {
                                    "type": "BasicKeyframedTrack",
                                    "keyframes": [
                                        { "id": "a", "position": 0, "value": 0, "connectedRight": true, "handles": [0.5, 1, 0.5, 0], "type": "bezier" },
                                        { "id": "b", "position": 4, "value": 1, "connectedRight": false, "handles": [0.5, 1, 0.5, 0], "type": "bezier" }
                                    ]
                                },
                                "t2": {
                                    "type": "BasicKeyframedTrack",
                                    "keyframes": [
                                        { "id": "c", "position": 2, "value": 3.0, "connectedRight": false, "handles": [0.5, 1, 0.5, 0] }
                                    ]
                                }
                            }
                        }
                    }
                }
            }
        },
        "definitionVersion": "0.4.0",
        "revisionHistory": ["abc"]
    }"#;

    #[test]
    fn resolves_overrides_and_tracks() {
        let state = ProjectState::from_json_str(STATE).unwrap();
        let timeline = state.object_timeline("Scene", "Shader").unwrap();
        assert_eq!(timeline.length(), 10.0);
        assert_eq!(timeline.track_count(), 2);

        let base = timeline.base();
        assert_eq!(base.uniforms.density, 2.5);
        assert_eq!(base.uniforms.brightness, Vec3::new(0.1, 0.1, 0.4));
        assert_eq!(base.transforms.scale, Vec3::new(1.0, 1.5, 1.0));
        assert_eq!(base.uniforms.amplitude, ShaderUniforms::default().amplitude);
    }

    #[test]
    fn evaluates_tracks_over_base() {
        let state = ProjectState::from_json_str(STATE).unwrap();
        let timeline = state.object_timeline("Scene", "Shader").unwrap();

        let start = timeline.evaluate(0.0);
        assert_eq!(start.uniforms.strength, 0.0);
        assert_eq!(start.transforms.rotation.y, 3.0);
        assert_eq!(start.uniforms.density, 2.5);

        let mid = timeline.evaluate(2.0);
        assert!((mid.uniforms.strength - 0.5).abs() < 1e-3);

        let end = timeline.evaluate(8.0);
        assert_eq!(end.uniforms.strength, 1.0);
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let state = ProjectState::from_json_str(STATE).unwrap();
        let err = state.object_timeline("Other", "Shader").unwrap_err();
        assert!(matches!(err, TrackError::MissingSheet(name) if name == "Other"));
    }

    #[test]
    fn missing_object_falls_back_to_defaults() {
        let state = ProjectState::from_json_str(STATE).unwrap();
        let timeline = state.object_timeline("Scene", "Camera").unwrap();
        assert_eq!(timeline.track_count(), 0);
        assert_eq!(timeline.evaluate(3.0), ParameterSnapshot::default());
    }

    #[test]
    fn non_numeric_override_is_rejected() {
        let text = r#"{"sheetsById": {"Scene": {"staticOverrides": {"byObject": {"Shader": {"uniforms": {"uOpacity": "high"}}}}}}}"#;
        let state = ProjectState::from_json_str(text).unwrap();
        let err = state.object_timeline("Scene", "Shader").unwrap_err();
        assert!(matches!(err, TrackError::NonNumeric(path) if path == "uniforms.uOpacity"));
    }

    #[test]
    fn prop_paths_parse() {
        assert_eq!(
            PropPath::parse(r#"["uniforms","uFrequency"]"#).unwrap(),
            Some(PropPath::Uniform(UniformName::Frequency))
        );
        assert_eq!(
            PropPath::parse(r#"["uniforms","uBrightness","y"]"#).unwrap(),
            Some(PropPath::UniformComponent(UniformName::Brightness, 1))
        );
        assert_eq!(
            PropPath::parse(r#"["transforms","position","z"]"#).unwrap(),
            Some(PropPath::Transform(TransformField::Position, 2))
        );
        assert_eq!(PropPath::parse(r#"["uniforms","uBrightness"]"#).unwrap(), None);
        assert_eq!(PropPath::parse(r#"["uniforms","uFrequency","x"]"#).unwrap(), None);
        assert!(PropPath::parse("not json").is_err());
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("state.json");
        std::fs::write(&json_path, STATE).unwrap();
        let json_state = ProjectState::load(&json_path).unwrap();
        assert!(json_state.sheets_by_id.contains_key("Scene"));

        let yaml_path = dir.path().join("state.yaml");
        std::fs::write(
            &yaml_path,
            "sheetsById:\n  Scene:\n    staticOverrides:\n      byObject:\n        Shader:\n          uniforms:\n            uFrequency: 3\n",
        )
        .unwrap();
        let yaml_state = ProjectState::load(&yaml_path).unwrap();
        let timeline = yaml_state.object_timeline("Scene", "Shader").unwrap();
        assert_eq!(timeline.base().uniforms.frequency, 3.0);
    }

    #[test]
    fn bundled_demo_track_resolves() {
        let state =
            ProjectState::from_json_str(include_str!("../../../demos/state.json")).unwrap();
        let timeline = state.object_timeline("Scene", "Shader").unwrap();
        assert_eq!(timeline.length(), 10.0);
        assert_eq!(timeline.track_count(), 5);

        let start = timeline.evaluate(0.0);
        assert_eq!(start.uniforms.amplitude, 2.5);
        assert_eq!(start.uniforms.strength, 0.0);
        assert_eq!(start.transforms.rotation.x, 0.2);

        // Hold keyframe at 6s keeps green until 8s.
        assert_eq!(timeline.evaluate(7.5).uniforms.brightness.y, 0.45);
        // Disconnected keyframe at 7s holds strength until 9s.
        assert_eq!(timeline.evaluate(8.0).uniforms.strength, 0.6);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ProjectState::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TrackError::Io(_)));
    }
}
