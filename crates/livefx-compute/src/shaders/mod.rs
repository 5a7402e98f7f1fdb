//! WGSL shader sources for the effect kernels.
//!
//! Texture kernels bind: 0 input texture, 1 rgba8unorm storage output,
//! 2 sampler, 3 params. Buffer kernels bind: 0 packed RGBA8 source,
//! 1 packed RGBA8 destination, 2 params, 3 weight field.
//!
//! Every `struct Params` here must match the [`UniformLayout`] table of its
//! kernel field for field.
//!
//! [`UniformLayout`]: crate::layout::UniformLayout

/// Gaussian blur over a precomputed weight field.
pub const GAUSSIAN_BLUR: &str = r#"
struct Params {
    width: u32,
    height: u32,
    radius: f32,
}

@group(0) @binding(0) var<storage, read> src: array<u32>;
@group(0) @binding(1) var<storage, read_write> dst: array<u32>;
@group(0) @binding(2) var<uniform> params: Params;
@group(0) @binding(3) var<storage, read> weights: array<f32>;

@compute @workgroup_size(8, 8)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if id.x >= params.width || id.y >= params.height { return; }

    let r = i32(ceil(max(params.radius, 0.0)));
    let side = 2 * r + 1;
    let w = i32(params.width);
    let h = i32(params.height);
    let cx = i32(id.x);
    let cy = i32(id.y);

    var acc = vec4<f32>(0.0);
    var weight_sum = 0.0;
    for (var ky = -r; ky <= r; ky++) {
        let y = cy + ky;
        if y < 0 || y >= h { continue; }
        for (var kx = -r; kx <= r; kx++) {
            let x = cx + kx;
            if x < 0 || x >= w { continue; }
            let wt = weights[(ky + r) * side + (kx + r)];
            acc += unpack4x8unorm(src[y * w + x]) * wt;
            weight_sum += wt;
        }
    }

    var color = unpack4x8unorm(src[cy * w + cx]);
    if weight_sum > 0.0 {
        color = acc / weight_sum;
    }
    dst[id.y * params.width + id.x] = pack4x8unorm(color);
}
"#;

/// Directional (motion) blur with optional fade toward the canvas center.
pub const DIRECTIONAL_BLUR: &str = r#"
struct Params {
    strength: f32,
    angle: f32,
    opacity: f32,
    blurMode: u32,
    fadeOut: f32,
    fadeDirection: f32,
    contentWidth: u32,
    contentHeight: u32,
}

@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var output_texture: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(2) var input_sampler: sampler;
@group(0) @binding(3) var<uniform> params: Params;

const MODE_BEHIND: u32 = 1u;
const MODE_FRONT: u32 = 2u;
const SPREAD: f32 = 1.5;
const SIGMA: f32 = 0.5;

fn direction(angle: f32) -> vec2<f32> {
    let rad = radians(angle);
    return vec2<f32>(cos(rad), sin(rad));
}

fn gaussian(distance: f32, sigma: f32) -> f32 {
    let x = distance / sigma;
    return exp(-(x * x) / 2.0);
}

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let dims = textureDimensions(input_texture);
    if id.x >= dims.x || id.y >= dims.y { return; }

    let dims_f = vec2<f32>(dims);
    let coord = (vec2<f32>(id.xy) + 0.5) / dims_f;
    let original = textureLoad(input_texture, vec2<i32>(id.xy), 0);

    if params.strength <= 0.0 || params.opacity <= 0.0 {
        textureStore(output_texture, id.xy, original);
        return;
    }

    let tex_offset = direction(params.angle) * params.strength / dims_f;
    let center = vec2<f32>(f32(params.contentWidth), f32(params.contentHeight)) * 0.5 / dims_f;
    let n = max(i32(params.strength), 5);

    var first = -n;
    var last = n;
    if params.blurMode == MODE_BEHIND {
        first = 0;
    } else if params.blurMode == MODE_FRONT {
        last = 0;
    }

    var blurred = vec4<f32>(0.0);
    var total = 0.0;
    for (var i = first; i <= last; i++) {
        if i == 0 {
            blurred += original;
            total += 1.0;
            continue;
        }

        let d = f32(abs(i)) / f32(n);
        var sample_coord = coord + tex_offset * (f32(i) / f32(n) * SPREAD);

        if params.fadeOut > 0.0 {
            let scale = max(1.0 - d * params.fadeOut, 0.01);
            sample_coord = center + (sample_coord - center) / scale;
            if params.fadeDirection != 0.0 {
                sample_coord.y += (1.0 - scale) * 0.5 * params.fadeDirection;
            }
        }
        sample_coord = clamp(sample_coord, vec2<f32>(0.0), vec2<f32>(1.0));

        let weight = gaussian(d, SIGMA);
        blurred += textureSampleLevel(input_texture, input_sampler, sample_coord, 0.0) * weight;
        total += weight;
    }

    var result = original;
    if total > 0.0 {
        blurred = blurred / total;
        var amount = params.opacity;
        if params.blurMode == MODE_BEHIND {
            amount = min(params.opacity * 0.7, 0.7);
        }
        result = mix(original, blurred, amount);
    }
    textureStore(output_texture, id.xy, result);
}
"#;

/// Per-channel offset sampling in RGB or CMYK.
pub const CHROMATIC_ABERRATION: &str = r#"
struct Params {
    strength: f32,
    angle: f32,
    colorMode: u32,
    opacity: f32,
    blendMode: u32,
}

@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var output_texture: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(2) var input_sampler: sampler;
@group(0) @binding(3) var<uniform> params: Params;

const MODE_RGB: u32 = 0u;
const BLEND_OVER: u32 = 0u;
const SIN_60: f32 = 0.866;

fn direction(angle: f32) -> vec2<f32> {
    let rad = radians(angle);
    return vec2<f32>(cos(rad), sin(rad));
}

fn screen(a: f32, b: f32) -> f32 {
    return 1.0 - (1.0 - a) * (1.0 - b);
}

fn rgb_to_cmyk(rgb: vec3<f32>) -> vec4<f32> {
    let k = 1.0 - max(max(rgb.r, rgb.g), rgb.b);
    if k == 1.0 {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    let cmy = (vec3<f32>(1.0) - rgb - vec3<f32>(k)) / (1.0 - k);
    return vec4<f32>(cmy, k);
}

fn cmyk_to_rgb(cmyk: vec4<f32>) -> vec3<f32> {
    return (vec3<f32>(1.0) - cmyk.xyz) * (1.0 - cmyk.w);
}

fn sample_at(coord: vec2<f32>) -> vec4<f32> {
    return textureSampleLevel(input_texture, input_sampler, coord, 0.0);
}

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let dims = textureDimensions(input_texture);
    if id.x >= dims.x || id.y >= dims.y { return; }

    let dims_f = vec2<f32>(dims);
    let coord = (vec2<f32>(id.xy) + 0.5) / dims_f;
    let original = textureLoad(input_texture, vec2<i32>(id.xy), 0);
    let offset = direction(params.angle) * params.strength / dims_f;

    var effect: vec4<f32>;
    if params.colorMode == MODE_RGB {
        let red = sample_at(coord + offset);
        let green = sample_at(coord);
        let blue = sample_at(coord - offset);
        let a = screen(screen(red.a, green.a), blue.a);
        effect = vec4<f32>(red.r, green.g, blue.b, a);
    } else {
        let perp = vec2<f32>(-offset.y, offset.x) * SIN_60;
        let cyan = sample_at(coord + offset);
        let magenta = sample_at(coord + perp);
        let yellow = sample_at(coord - offset);
        let black = sample_at(coord - perp);

        let cmyk = vec4<f32>(
            rgb_to_cmyk(cyan.rgb).x,
            rgb_to_cmyk(magenta.rgb).y,
            rgb_to_cmyk(yellow.rgb).z,
            rgb_to_cmyk(black.rgb).w,
        );
        let a = screen(screen(screen(cyan.a, magenta.a), yellow.a), black.a);
        effect = vec4<f32>(cmyk_to_rgb(cmyk), a);
    }

    var result: vec4<f32>;
    if params.blendMode == BLEND_OVER {
        result = mix(original, effect, params.opacity);
    } else {
        result = mix(effect, original, 1.0 - params.opacity);
    }
    textureStore(output_texture, id.xy, result);
}
"#;
