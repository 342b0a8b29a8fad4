use serde::{Deserialize, Serialize};

/// Interpolation from a keyframe to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframeKind {
    #[default]
    Bezier,
    /// Step: keep this keyframe's value until the next keyframe.
    Hold,
}

fn default_connected() -> bool {
    true
}

fn default_handles() -> [f32; 4] {
    [0.5, 1.0, 0.5, 0.0]
}

/// A single keyframe on a numeric track.
///
/// `handles` is `[left_x, left_y, right_x, right_y]`, each relative to the
/// segment on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub position: f32,
    pub value: f32,
    #[serde(default = "default_connected")]
    pub connected_right: bool,
    #[serde(default = "default_handles")]
    pub handles: [f32; 4],
    #[serde(default, rename = "type")]
    pub kind: KeyframeKind,
}

impl Keyframe {
    pub fn new(position: f32, value: f32) -> Self {
        Self {
            position,
            value,
            connected_right: true,
            handles: default_handles(),
            kind: KeyframeKind::Bezier,
        }
    }
}

/// Keyframes of one numeric property, sorted by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframedTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframedTrack {
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { keyframes }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Value at `position` (seconds). `None` for a track without keyframes.
    ///
    /// Before the first keyframe the first value holds; after the last the
    /// last value holds. A NaN position reads as the first value.
    pub fn value_at(&self, position: f32) -> Option<f32> {
        let first = self.keyframes.first()?;
        if position.is_nan() || position <= first.position {
            return Some(first.value);
        }
        // Index of the first keyframe strictly after `position`.
        let next = self.keyframes.partition_point(|k| k.position <= position);
        let Some(right) = self.keyframes.get(next) else {
            return self.keyframes.last().map(|k| k.value);
        };
        let Some(left) = next.checked_sub(1).and_then(|i| self.keyframes.get(i)) else {
            return Some(first.value);
        };
        Some(interpolate(left, right, position))
    }
}

fn interpolate(left: &Keyframe, right: &Keyframe, position: f32) -> f32 {
    if !left.connected_right || left.kind == KeyframeKind::Hold {
        return left.value;
    }
    let span = right.position - left.position;
    if span <= 0.0 {
        return right.value;
    }
    let progress = ((position - left.position) / span).clamp(0.0, 1.0);
    let curve = UnitBezier::new(
        left.handles[2],
        left.handles[3],
        right.handles[0],
        right.handles[1],
    );
    let eased = curve.solve(progress);
    left.value + eased * (right.value - left.value)
}

/// Cubic bezier from (0,0) to (1,1) with two free control points, solved for
/// `y` given `x`.
#[derive(Debug, Clone, Copy)]
pub struct UnitBezier {
    ax: f32,
    bx: f32,
    cx: f32,
    ay: f32,
    by: f32,
    cy: f32,
}

const SOLVE_EPSILON: f32 = 1e-6;

impl UnitBezier {
    pub fn new(p1x: f32, p1y: f32, p2x: f32, p2y: f32) -> Self {
        let cx = 3.0 * p1x;
        let bx = 3.0 * (p2x - p1x) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * p1y;
        let by = 3.0 * (p2y - p1y) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    fn sample_x(&self, t: f32) -> f32 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f32) -> f32 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_dx(&self, t: f32) -> f32 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Curve parameter `t` whose x equals `x`: Newton first, bisection if
    /// Newton stalls.
    fn solve_t(&self, x: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample_x(t) - x;
            if err.abs() < SOLVE_EPSILON {
                return t;
            }
            let d = self.sample_dx(t);
            if d.abs() < SOLVE_EPSILON {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        t = x;
        for _ in 0..64 {
            let v = self.sample_x(t);
            if (v - x).abs() < SOLVE_EPSILON {
                break;
            }
            if x > v {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    pub fn solve(&self, x: f32) -> f32 {
        self.sample_y(self.solve_t(x.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_pair(v0: f32, v1: f32) -> KeyframedTrack {
        let mut a = Keyframe::new(0.0, v0);
        a.handles = [0.0, 0.0, 1.0 / 3.0, 1.0 / 3.0];
        let mut b = Keyframe::new(2.0, v1);
        b.handles = [2.0 / 3.0, 2.0 / 3.0, 0.0, 0.0];
        KeyframedTrack::new(vec![a, b])
    }

    #[test]
    fn empty_track_has_no_value() {
        assert_eq!(KeyframedTrack::default().value_at(1.0), None);
    }

    #[test]
    fn nan_position_reads_first_value() {
        let track = linear_pair(1.0, 3.0);
        assert_eq!(track.value_at(f32::NAN), Some(1.0));
    }

    #[test]
    fn clamps_outside_keyframe_range() {
        let track = linear_pair(1.0, 3.0);
        assert_eq!(track.value_at(-5.0), Some(1.0));
        assert_eq!(track.value_at(2.0), Some(3.0));
        assert_eq!(track.value_at(10.0), Some(3.0));
    }

    #[test]
    fn linear_handles_interpolate_linearly() {
        let track = linear_pair(0.0, 10.0);
        let v = track.value_at(0.5).unwrap();
        assert!((v - 2.5).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn default_handles_ease_in_out() {
        let track = KeyframedTrack::new(vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)]);
        let early = track.value_at(0.1).unwrap();
        let mid = track.value_at(0.5).unwrap();
        let late = track.value_at(0.9).unwrap();
        assert!(early < 0.1);
        assert!((mid - 0.5).abs() < 1e-3);
        assert!(late > 0.9);
    }

    #[test]
    fn disconnected_keyframe_holds() {
        let mut a = Keyframe::new(0.0, 4.0);
        a.connected_right = false;
        let track = KeyframedTrack::new(vec![a, Keyframe::new(1.0, 8.0)]);
        assert_eq!(track.value_at(0.99), Some(4.0));
        assert_eq!(track.value_at(1.0), Some(8.0));
    }

    #[test]
    fn hold_kind_steps() {
        let mut a = Keyframe::new(0.0, -1.0);
        a.kind = KeyframeKind::Hold;
        let track = KeyframedTrack::new(vec![a, Keyframe::new(1.0, 1.0)]);
        assert_eq!(track.value_at(0.5), Some(-1.0));
    }

    #[test]
    fn keyframes_are_sorted_on_construction() {
        let track = KeyframedTrack::new(vec![Keyframe::new(3.0, 3.0), Keyframe::new(1.0, 1.0)]);
        assert_eq!(track.keyframes()[0].position, 1.0);
        assert_eq!(track.value_at(0.0), Some(1.0));
    }

    #[test]
    fn parses_with_defaults() {
        let kf: Keyframe = serde_json::from_str(r#"{"position": 1.5, "value": 2}"#).unwrap();
        assert!(kf.connected_right);
        assert_eq!(kf.handles, [0.5, 1.0, 0.5, 0.0]);
        assert_eq!(kf.kind, KeyframeKind::Bezier);
    }

    #[test]
    fn bezier_endpoints_are_fixed() {
        let curve = UnitBezier::new(0.42, 0.0, 0.58, 1.0);
        assert!(curve.solve(0.0).abs() < 1e-5);
        assert!((curve.solve(1.0) - 1.0).abs() < 1e-5);
    }
}
