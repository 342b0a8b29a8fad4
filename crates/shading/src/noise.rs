//! Classic Perlin gradient noise, periodic variant.
//!
//! Hashing uses the `mod 289` polynomial permutation `((34x + 1) x) mod 289`
//! and gradients are unpacked from the hash on a 7x7 grid folded onto the
//! octahedron `|x| + |y| + |z| = 0.5`. The arithmetic is kept in `f32` and in
//! the same order as the WGSL port so the CPU and GPU fields agree.

use glam::{Vec3, Vec4};

/// Output scale applied to the interpolated corner contributions.
pub const NOISE_SCALE: f32 = 2.2;

/// Tiling period used by the displacement stage.
pub const DISPLACEMENT_PERIOD: Vec3 = Vec3::splat(10.0);

/// Deterministic, continuous, periodic 3D gradient noise.
///
/// Stateless; `sample` is a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseField;

impl NoiseField {
    pub fn new() -> Self {
        Self
    }

    /// Sample the field at `point`, tiling with `period` on each axis.
    ///
    /// Values fall in roughly `[-2.2, 2.2]` and are not clamped. Integer
    /// lattice points always evaluate to exactly zero.
    pub fn sample(&self, point: Vec3, period: Vec3) -> f32 {
        pnoise(point, period)
    }
}

/// Free-function form of [`NoiseField::sample`].
pub fn pnoise(p: Vec3, rep: Vec3) -> f32 {
    // Lattice cell and its successor, both wrapped by the period.
    let cell = glsl_mod(p.floor(), rep);
    let pi0 = mod289_3(cell);
    let pi1 = mod289_3(glsl_mod(cell + Vec3::ONE, rep));
    let pf0 = fract3(p);
    let pf1 = pf0 - Vec3::ONE;

    let ix = Vec4::new(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = Vec4::new(pi0.y, pi0.y, pi1.y, pi1.y);
    let iz0 = Vec4::splat(pi0.z);
    let iz1 = Vec4::splat(pi1.z);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + iz0);
    let ixy1 = permute(ixy + iz1);

    let (gx0, gy0, gz0) = unpack_gradients(ixy0);
    let (gx1, gy1, gz1) = unpack_gradients(ixy1);

    let mut g000 = Vec3::new(gx0.x, gy0.x, gz0.x);
    let mut g100 = Vec3::new(gx0.y, gy0.y, gz0.y);
    let mut g010 = Vec3::new(gx0.z, gy0.z, gz0.z);
    let mut g110 = Vec3::new(gx0.w, gy0.w, gz0.w);
    let mut g001 = Vec3::new(gx1.x, gy1.x, gz1.x);
    let mut g101 = Vec3::new(gx1.y, gy1.y, gz1.y);
    let mut g011 = Vec3::new(gx1.z, gy1.z, gz1.z);
    let mut g111 = Vec3::new(gx1.w, gy1.w, gz1.w);

    let norm0 = taylor_inv_sqrt(Vec4::new(
        g000.dot(g000),
        g010.dot(g010),
        g100.dot(g100),
        g110.dot(g110),
    ));
    g000 *= norm0.x;
    g010 *= norm0.y;
    g100 *= norm0.z;
    g110 *= norm0.w;
    let norm1 = taylor_inv_sqrt(Vec4::new(
        g001.dot(g001),
        g011.dot(g011),
        g101.dot(g101),
        g111.dot(g111),
    ));
    g001 *= norm1.x;
    g011 *= norm1.y;
    g101 *= norm1.z;
    g111 *= norm1.w;

    let n000 = g000.dot(pf0);
    let n100 = g100.dot(Vec3::new(pf1.x, pf0.y, pf0.z));
    let n010 = g010.dot(Vec3::new(pf0.x, pf1.y, pf0.z));
    let n110 = g110.dot(Vec3::new(pf1.x, pf1.y, pf0.z));
    let n001 = g001.dot(Vec3::new(pf0.x, pf0.y, pf1.z));
    let n101 = g101.dot(Vec3::new(pf1.x, pf0.y, pf1.z));
    let n011 = g011.dot(Vec3::new(pf0.x, pf1.y, pf1.z));
    let n111 = g111.dot(pf1);

    let fade_xyz = fade(pf0);
    let n_z = Vec4::new(n000, n100, n010, n110).lerp(
        Vec4::new(n001, n101, n011, n111),
        fade_xyz.z,
    );
    let n_yz_x = mix(n_z.x, n_z.z, fade_xyz.y);
    let n_yz_y = mix(n_z.y, n_z.w, fade_xyz.y);
    let n_xyz = mix(n_yz_x, n_yz_y, fade_xyz.x);
    NOISE_SCALE * n_xyz
}

/// Quintic fade `t^3 (t (6t - 15) + 10)`, C2-continuous at 0 and 1.
pub fn fade(t: Vec3) -> Vec3 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Four hashes to four (unnormalised) gradient vectors, split by component.
fn unpack_gradients(hash: Vec4) -> (Vec4, Vec4, Vec4) {
    let mut gx = hash * (1.0 / 7.0);
    let mut gy = fract4(gx.floor() * (1.0 / 7.0)) - 0.5;
    gx = fract4(gx);
    let gz = Vec4::splat(0.5) - gx.abs() - gy.abs();
    let sz = step4(gz, Vec4::ZERO);
    gx -= sz * (step4(Vec4::ZERO, gx) - 0.5);
    gy -= sz * (step4(Vec4::ZERO, gy) - 0.5);
    (gx, gy, gz)
}

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4(((x * 34.0) + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - 0.853_734_7 * r
}

/// Floor-based modulo (result takes the sign of `y`).
fn glsl_mod(x: Vec3, y: Vec3) -> Vec3 {
    x - y * (x / y).floor()
}

// `x - floor(x)`; stays in [0, 1) for negative inputs too.
fn fract3(x: Vec3) -> Vec3 {
    x - x.floor()
}

fn fract4(x: Vec4) -> Vec4 {
    x - x.floor()
}

/// Component-wise `x >= edge ? 1 : 0`.
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmpge(edge), Vec4::ONE, Vec4::ZERO)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
