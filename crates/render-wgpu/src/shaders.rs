/// WGSL for the displaced, palette-coloured sphere.
///
/// `vs_main` and `fs_main` mirror `DisplacementShader` and `ColorShader`
/// from the shading crate step for step. `mod` is written out with `floor`
/// because WGSL's `%` truncates toward zero.
pub const MORPH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    // frequency, amplitude, density, strength
    motion: vec4<f32>,
    // deep_purple, opacity, unused, unused
    tint: vec4<f32>,
    // rgb brightness, unused w
    brightness: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) distortion: f32,
};

fn mod_floor3(x: vec3<f32>, y: vec3<f32>) -> vec3<f32> {
    return x - y * floor(x / y);
}

fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt(r: vec4<f32>) -> vec4<f32> {
    return vec4<f32>(1.79284291400159) - 0.85373472095314 * r;
}

fn fade(t: vec3<f32>) -> vec3<f32> {
    return t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
}

fn pnoise(p: vec3<f32>, rep: vec3<f32>) -> f32 {
    let cell = mod_floor3(floor(p), rep);
    let pi0 = mod289_3(cell);
    let pi1 = mod289_3(mod_floor3(cell + vec3<f32>(1.0), rep));
    let pf0 = fract(p);
    let pf1 = pf0 - vec3<f32>(1.0);

    let ix = vec4<f32>(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = vec4<f32>(pi0.y, pi0.y, pi1.y, pi1.y);
    let iz0 = vec4<f32>(pi0.z);
    let iz1 = vec4<f32>(pi1.z);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + iz0);
    let ixy1 = permute(ixy + iz1);

    var gx0 = ixy0 * (1.0 / 7.0);
    var gy0 = fract(floor(gx0) * (1.0 / 7.0)) - 0.5;
    gx0 = fract(gx0);
    let gz0 = vec4<f32>(0.5) - abs(gx0) - abs(gy0);
    let sz0 = step(gz0, vec4<f32>(0.0));
    gx0 = gx0 - sz0 * (step(vec4<f32>(0.0), gx0) - 0.5);
    gy0 = gy0 - sz0 * (step(vec4<f32>(0.0), gy0) - 0.5);

    var gx1 = ixy1 * (1.0 / 7.0);
    var gy1 = fract(floor(gx1) * (1.0 / 7.0)) - 0.5;
    gx1 = fract(gx1);
    let gz1 = vec4<f32>(0.5) - abs(gx1) - abs(gy1);
    let sz1 = step(gz1, vec4<f32>(0.0));
    gx1 = gx1 - sz1 * (step(vec4<f32>(0.0), gx1) - 0.5);
    gy1 = gy1 - sz1 * (step(vec4<f32>(0.0), gy1) - 0.5);

    var g000 = vec3<f32>(gx0.x, gy0.x, gz0.x);
    var g100 = vec3<f32>(gx0.y, gy0.y, gz0.y);
    var g010 = vec3<f32>(gx0.z, gy0.z, gz0.z);
    var g110 = vec3<f32>(gx0.w, gy0.w, gz0.w);
    var g001 = vec3<f32>(gx1.x, gy1.x, gz1.x);
    var g101 = vec3<f32>(gx1.y, gy1.y, gz1.y);
    var g011 = vec3<f32>(gx1.z, gy1.z, gz1.z);
    var g111 = vec3<f32>(gx1.w, gy1.w, gz1.w);

    let norm0 = taylor_inv_sqrt(vec4<f32>(dot(g000, g000), dot(g010, g010), dot(g100, g100), dot(g110, g110)));
    g000 = g000 * norm0.x;
    g010 = g010 * norm0.y;
    g100 = g100 * norm0.z;
    g110 = g110 * norm0.w;
    let norm1 = taylor_inv_sqrt(vec4<f32>(dot(g001, g001), dot(g011, g011), dot(g101, g101), dot(g111, g111)));
    g001 = g001 * norm1.x;
    g011 = g011 * norm1.y;
    g101 = g101 * norm1.z;
    g111 = g111 * norm1.w;

    let n000 = dot(g000, pf0);
    let n100 = dot(g100, vec3<f32>(pf1.x, pf0.y, pf0.z));
    let n010 = dot(g010, vec3<f32>(pf0.x, pf1.y, pf0.z));
    let n110 = dot(g110, vec3<f32>(pf1.x, pf1.y, pf0.z));
    let n001 = dot(g001, vec3<f32>(pf0.x, pf0.y, pf1.z));
    let n101 = dot(g101, vec3<f32>(pf1.x, pf0.y, pf1.z));
    let n011 = dot(g011, vec3<f32>(pf0.x, pf1.y, pf1.z));
    let n111 = dot(g111, pf1);

    let fade_xyz = fade(pf0);
    let n_z = mix(vec4<f32>(n000, n100, n010, n110), vec4<f32>(n001, n101, n011, n111), vec4<f32>(fade_xyz.z));
    let n_yz = mix(n_z.xy, n_z.zw, vec2<f32>(fade_xyz.y));
    let n_xyz = mix(n_yz.x, n_yz.y, fade_xyz.x);
    return 2.2 * n_xyz;
}

fn rotate_y(angle: f32) -> mat3x3<f32> {
    let s = sin(angle);
    let c = cos(angle);
    return mat3x3<f32>(
        vec3<f32>(c, 0.0, -s),
        vec3<f32>(0.0, 1.0, 0.0),
        vec3<f32>(s, 0.0, c),
    );
}

fn cos_palette(t: f32, a: vec3<f32>, b: vec3<f32>, c: vec3<f32>, d: vec3<f32>) -> vec3<f32> {
    return a + b * cos(6.283185307179586 * (c * t + d));
}

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let frequency = uniforms.motion.x;
    let amplitude = uniforms.motion.y;
    let density = uniforms.motion.z;
    let strength = uniforms.motion.w;

    let distortion = pnoise(vertex.normal * density, vec3<f32>(10.0)) * strength;
    let displaced = vertex.position + vertex.normal * distortion;
    let angle = sin(vertex.uv.y * frequency) * amplitude;
    let rotated = rotate_y(angle) * displaced;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.model * vec4<f32>(rotated, 1.0);
    out.distortion = distortion;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = in.distortion * 3.0;
    let brightness = uniforms.brightness.xyz;
    let contrast = vec3<f32>(0.3, 0.3, 0.3);
    let oscillation = vec3<f32>(0.5, 0.5, 0.9);
    let phase = vec3<f32>(0.9, 0.1, 0.8);
    let color = cos_palette(d, brightness, contrast, oscillation, phase);

    let deep_purple = min(uniforms.tint.x, 1.0);
    let opacity = min(uniforms.tint.y, 1.0);
    return vec4<f32>(color, in.distortion) + vec4<f32>(deep_purple, 0.0, 0.5, opacity);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    #[test]
    fn morph_shader_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(MORPH_SHADER)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(MORPH_SHADER)));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{e:?}"));

        let entry_points: Vec<_> = module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect();
        assert!(entry_points.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(entry_points.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }
}
