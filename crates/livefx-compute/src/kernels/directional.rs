//! CPU reference for the directional blur kernel.

use livefx_core::PixelBuffer;
use rayon::prelude::*;

use super::sampler::{Texture, add_scaled, mix, store};
use super::{uniform_f32, uniform_u32};
use crate::ComputeResult;
use crate::layout::UniformBlock;

const MODE_BEHIND: u32 = 1;
const MODE_FRONT: u32 = 2;
const SPREAD: f32 = 1.5;
const SIGMA: f32 = 0.5;

struct Params {
    strength: f32,
    angle: f32,
    opacity: f32,
    mode: u32,
    fade_out: f32,
    fade_direction: f32,
    content: (f32, f32),
}

impl Params {
    fn read(block: &UniformBlock) -> ComputeResult<Self> {
        Ok(Self {
            strength: uniform_f32(block, "strength")?,
            angle: uniform_f32(block, "angle")?,
            opacity: uniform_f32(block, "opacity")?,
            mode: uniform_u32(block, "blurMode")?,
            fade_out: uniform_f32(block, "fadeOut")?,
            fade_direction: uniform_f32(block, "fadeDirection")?,
            content: (
                uniform_u32(block, "contentWidth")? as f32,
                uniform_u32(block, "contentHeight")? as f32,
            ),
        })
    }
}

fn gaussian(distance: f32, sigma: f32) -> f32 {
    let x = distance / sigma;
    (-(x * x) / 2.0).exp()
}

pub(crate) fn run(image: &PixelBuffer, uniforms: &UniformBlock) -> ComputeResult<PixelBuffer> {
    let p = Params::read(uniforms)?;
    let mut out = image.clone();
    if image.is_empty() || p.strength <= 0.0 || p.opacity <= 0.0 {
        return Ok(out);
    }

    let tex = Texture::new(image.width(), image.height(), image.data());
    let (dw, dh) = tex.dims();
    let rad = p.angle.to_radians();
    let offset = (rad.cos() * p.strength / dw, rad.sin() * p.strength / dh);
    let center = (p.content.0 * 0.5 / dw, p.content.1 * 0.5 / dh);
    let n = (p.strength as i32).max(5);
    let (first, last) = match p.mode {
        MODE_BEHIND => (0, n),
        MODE_FRONT => (-n, 0),
        _ => (-n, n),
    };
    let amount = if p.mode == MODE_BEHIND {
        (p.opacity * 0.7).min(0.7)
    } else {
        p.opacity
    };

    let width = image.width() as usize;
    out.data_mut()
        .par_chunks_mut(image.stride())
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let u = (x as f32 + 0.5) / dw;
                let v = (y as f32 + 0.5) / dh;
                let original = tex.load(x as i64, y as i64);

                let mut blurred = [0.0f32; 4];
                let mut total = 0.0f32;
                for i in first..=last {
                    if i == 0 {
                        add_scaled(&mut blurred, original, 1.0);
                        total += 1.0;
                        continue;
                    }
                    let d = i.abs() as f32 / n as f32;
                    let step = i as f32 / n as f32 * SPREAD;
                    let mut su = u + offset.0 * step;
                    let mut sv = v + offset.1 * step;

                    if p.fade_out > 0.0 {
                        let scale = (1.0 - d * p.fade_out).max(0.01);
                        su = center.0 + (su - center.0) / scale;
                        sv = center.1 + (sv - center.1) / scale;
                        if p.fade_direction != 0.0 {
                            sv += (1.0 - scale) * 0.5 * p.fade_direction;
                        }
                    }
                    let (su, sv) = (su.clamp(0.0, 1.0), sv.clamp(0.0, 1.0));

                    let weight = gaussian(d, SIGMA);
                    add_scaled(&mut blurred, tex.sample(su, sv), weight);
                    total += weight;
                }

                let blurred = blurred.map(|c| c / total);
                let i = x * 4;
                row[i..i + 4].copy_from_slice(&store(mix(original, blurred, amount)));
            }
        });
    Ok(out)
}
