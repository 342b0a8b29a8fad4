use glam::Vec3;
use std::f32::consts::TAU;

/// Cosine palette: per channel `a + b * cos(2π (c t + d))`.
///
/// `a` is the bias, `b` the amplitude, `c` the frequency and `d` the phase.
pub fn cosine_palette(t: f32, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec3 {
    let arg = (c * t + d) * TAU;
    a + b * Vec3::new(arg.x.cos(), arg.y.cos(), arg.z.cos())
}

/// The four palette vectors bundled together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bias: Vec3,
    pub amplitude: Vec3,
    pub frequency: Vec3,
    pub phase: Vec3,
}

impl Palette {
    pub fn eval(&self, t: f32) -> Vec3 {
        cosine_palette(t, self.bias, self.amplitude, self.frequency, self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Vec3 = Vec3::new(0.1, 0.1, 0.9);
    const B: Vec3 = Vec3::new(0.3, 0.3, 0.3);
    const C: Vec3 = Vec3::new(0.5, 0.5, 0.9);
    const D: Vec3 = Vec3::new(0.9, 0.1, 0.8);

    #[test]
    fn periodic_per_channel() {
        let start = cosine_palette(0.0, A, B, C, D);
        let x_period = cosine_palette(1.0 / C.x, A, B, C, D);
        assert!((start.x - x_period.x).abs() < 1e-5);
        let z_period = cosine_palette(1.0 / C.z, A, B, C, D);
        assert!((start.z - z_period.z).abs() < 1e-5);
    }

    #[test]
    fn zero_amplitude_returns_bias() {
        let out = cosine_palette(0.73, A, Vec3::ZERO, C, D);
        assert_eq!(out, A);
    }

    #[test]
    fn zero_phase_and_time_peaks() {
        let out = cosine_palette(0.0, Vec3::ZERO, Vec3::ONE, C, Vec3::ZERO);
        assert!((out - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn struct_form_matches_function() {
        let palette = Palette {
            bias: A,
            amplitude: B,
            frequency: C,
            phase: D,
        };
        assert_eq!(palette.eval(0.4), cosine_palette(0.4, A, B, C, D));
    }
}
