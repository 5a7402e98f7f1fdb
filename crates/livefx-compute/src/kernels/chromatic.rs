//! CPU reference for the chromatic aberration kernel.

use livefx_core::PixelBuffer;
use rayon::prelude::*;

use super::sampler::{Rgba, Texture, mix, store};
use super::{uniform_f32, uniform_u32};
use crate::ComputeResult;
use crate::layout::UniformBlock;

const MODE_RGB: u32 = 0;
const BLEND_OVER: u32 = 0;
const SIN_60: f32 = 0.866;

#[inline]
fn screen(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

/// `k = 1 - max(r, g, b)`; pure black maps to `(0, 0, 0, 1)`.
pub(crate) fn rgb_to_cmyk(r: f32, g: f32, b: f32) -> [f32; 4] {
    let k = 1.0 - r.max(g).max(b);
    if k == 1.0 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    let inv = 1.0 - k;
    [(1.0 - r - k) / inv, (1.0 - g - k) / inv, (1.0 - b - k) / inv, k]
}

pub(crate) fn cmyk_to_rgb(cmyk: [f32; 4]) -> [f32; 3] {
    let [c, m, y, k] = cmyk;
    [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)]
}

pub(crate) fn run(image: &PixelBuffer, uniforms: &UniformBlock) -> ComputeResult<PixelBuffer> {
    let strength = uniform_f32(uniforms, "strength")?;
    let angle = uniform_f32(uniforms, "angle")?;
    let color_mode = uniform_u32(uniforms, "colorMode")?;
    let opacity = uniform_f32(uniforms, "opacity")?;
    let blend_mode = uniform_u32(uniforms, "blendMode")?;

    let mut out = image.clone();
    if image.is_empty() {
        return Ok(out);
    }
    let tex = Texture::new(image.width(), image.height(), image.data());
    let (dw, dh) = tex.dims();
    let rad = angle.to_radians();
    let (ox, oy) = (rad.cos() * strength / dw, rad.sin() * strength / dh);
    let (px, py) = (-oy * SIN_60, ox * SIN_60);

    let width = image.width() as usize;
    out.data_mut()
        .par_chunks_mut(image.stride())
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let u = (x as f32 + 0.5) / dw;
                let v = (y as f32 + 0.5) / dh;
                let original = tex.load(x as i64, y as i64);

                let effect: Rgba = if color_mode == MODE_RGB {
                    let red = tex.sample(u + ox, v + oy);
                    let green = tex.sample(u, v);
                    let blue = tex.sample(u - ox, v - oy);
                    let a = screen(screen(red[3], green[3]), blue[3]);
                    [red[0], green[1], blue[2], a]
                } else {
                    let cyan = tex.sample(u + ox, v + oy);
                    let magenta = tex.sample(u + px, v + py);
                    let yellow = tex.sample(u - ox, v - oy);
                    let black = tex.sample(u - px, v - py);
                    let cmyk = [
                        rgb_to_cmyk(cyan[0], cyan[1], cyan[2])[0],
                        rgb_to_cmyk(magenta[0], magenta[1], magenta[2])[1],
                        rgb_to_cmyk(yellow[0], yellow[1], yellow[2])[2],
                        rgb_to_cmyk(black[0], black[1], black[2])[3],
                    ];
                    let [r, g, b] = cmyk_to_rgb(cmyk);
                    let a = screen(screen(screen(cyan[3], magenta[3]), yellow[3]), black[3]);
                    [r, g, b, a]
                };

                let result = if blend_mode == BLEND_OVER {
                    mix(original, effect, opacity)
                } else {
                    mix(effect, original, 1.0 - opacity)
                };
                let i = x * 4;
                row[i..i + 4].copy_from_slice(&store(result));
            }
        });
    Ok(out)
}
