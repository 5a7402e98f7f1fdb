//! Gaussian weight field and CPU reference blur.

use std::f64::consts::PI;

use livefx_core::{Error, PixelBuffer};
use rayon::prelude::*;

use super::sampler::{Rgba, add_scaled, store, unorm};
use super::{uniform_f32, uniform_u32};
use crate::ComputeResult;
use crate::layout::UniformBlock;

/// Integer kernel radius for a real blur radius: `ceil(max(radius, 0))`.
///
/// Takes `f32` so the result matches what the shader computes from the
/// packed uniform.
pub fn kernel_radius(radius: f32) -> u32 {
    if radius.is_finite() && radius > 0.0 {
        radius.ceil() as u32
    } else {
        0
    }
}

/// Tap count of the weight field for `radius`, or `None` past `u64`.
///
/// Callers size-check with this before calling [`gaussian_weights`].
pub fn gaussian_weight_count(radius: f32) -> Option<u64> {
    let side = 2 * kernel_radius(radius) as u64 + 1;
    side.checked_mul(side)
}

/// Normalized 2-D Gaussian weights, row-major, side `2r + 1`.
///
/// `sigma = r / 2`; a zero radius yields the single weight `[1.0]`.
pub fn gaussian_weights(radius: f32) -> Vec<f32> {
    let r = kernel_radius(radius) as i64;
    if r == 0 {
        return vec![1.0];
    }
    let sigma = r as f64 / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let norm = 1.0 / (PI * two_sigma_sq);

    let raw: Vec<f64> = (-r..=r)
        .flat_map(|y| {
            (-r..=r).map(move |x| {
                let (x, y) = (x as f64, y as f64);
                norm * (-(x * x + y * y) / two_sigma_sq).exp()
            })
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Runs the blur over a packed image, skipping out-of-bounds taps.
pub(crate) fn run(image: &PixelBuffer, uniforms: &UniformBlock, weights: &[f32]) -> ComputeResult<PixelBuffer> {
    let width = uniform_u32(uniforms, "width")? as i64;
    let height = uniform_u32(uniforms, "height")? as i64;
    let r = kernel_radius(uniform_f32(uniforms, "radius")?) as i64;
    let side = (2 * r + 1) as usize;
    if weights.len() != side * side {
        return Err(Error::BufferSizeMismatch { expected: side * side, actual: weights.len() }.into());
    }
    if width != image.width() as i64 || height != image.height() as i64 {
        return Err(Error::GeometryMismatch {
            width: image.width(),
            height: image.height(),
            target_width: width as u32,
            target_height: height as u32,
        }
        .into());
    }

    let mut out = image.clone();
    if image.is_empty() {
        return Ok(out);
    }
    let src = image.data();
    let texel = |x: i64, y: i64| -> Rgba {
        let i = ((y * width + x) * 4) as usize;
        [unorm(src[i]), unorm(src[i + 1]), unorm(src[i + 2]), unorm(src[i + 3])]
    };

    let stride = image.stride();
    out.data_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let cy = y as i64;
            for cx in 0..width {
                let mut acc = [0.0f32; 4];
                let mut weight_sum = 0.0f32;
                for ky in -r..=r {
                    let sy = cy + ky;
                    if sy < 0 || sy >= height {
                        continue;
                    }
                    for kx in -r..=r {
                        let sx = cx + kx;
                        if sx < 0 || sx >= width {
                            continue;
                        }
                        let wt = weights[((ky + r) as usize) * side + (kx + r) as usize];
                        add_scaled(&mut acc, texel(sx, sy), wt);
                        weight_sum += wt;
                    }
                }
                let color = if weight_sum > 0.0 {
                    acc.map(|v| v / weight_sum)
                } else {
                    texel(cx, cy)
                };
                let i = cx as usize * 4;
                row[i..i + 4].copy_from_slice(&store(color));
            }
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::GAUSSIAN_BLUR_LAYOUT;
    use crate::layout::pack;
    use approx::assert_relative_eq;
    use livefx_core::{ParamSchema, ParamSpec};
    use serde_json::json;

    static SCHEMA: ParamSchema = ParamSchema::new(&[("radius", ParamSpec::Real { default: 1.0 })]);

    fn blur(image: &PixelBuffer, radius: f64) -> PixelBuffer {
        let params = SCHEMA.resolve(&json!({ "radius": radius })).unwrap();
        let block = pack(&GAUSSIAN_BLUR_LAYOUT, &params, (image.width(), image.height())).unwrap();
        let weights = gaussian_weights(radius as f32);
        run(image, &block, &weights).unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        for radius in [0.0f32, 0.3, 1.0, 2.5, 7.0, 20.0] {
            let w = gaussian_weights(radius);
            let side = 2 * kernel_radius(radius) as usize + 1;
            assert_eq!(w.len(), side * side);
            let sum: f64 = w.iter().map(|v| *v as f64).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_weights_zero_radius() {
        assert_eq!(gaussian_weights(0.0), vec![1.0]);
        assert_eq!(gaussian_weights(-4.0), vec![1.0]);
        assert_eq!(gaussian_weights(f32::NAN), vec![1.0]);
    }

    #[test]
    fn test_weights_symmetric_and_peaked() {
        let w = gaussian_weights(2.0);
        let side = 5;
        let center = w[2 * side + 2];
        assert!(w.iter().all(|v| *v <= center));
        assert_eq!(w[0], w[side * side - 1]);
        assert_eq!(w[1], w[side]);
    }

    #[test]
    fn test_weight_count() {
        assert_eq!(gaussian_weight_count(0.0), Some(1));
        assert_eq!(gaussian_weight_count(2.5), Some(49));
        assert_eq!(gaussian_weight_count(20.0), Some(gaussian_weights(20.0).len() as u64));
        assert_eq!(gaussian_weight_count(1.0e9), Some(2_000_000_001u64 * 2_000_000_001));
        assert_eq!(gaussian_weight_count(3.0e9), None);
        assert_eq!(gaussian_weight_count(f32::MAX), None);
    }

    #[test]
    fn test_kernel_radius() {
        assert_eq!(kernel_radius(1.0), 1);
        assert_eq!(kernel_radius(1.2), 2);
        assert_eq!(kernel_radius(0.0), 0);
        assert_eq!(kernel_radius(f32::INFINITY), 0);
    }

    #[test]
    fn test_uniform_image_unchanged() {
        // edge renormalization keeps flat fields flat
        let img = PixelBuffer::filled(9, 6, [120, 40, 200, 255]);
        assert_eq!(blur(&img, 3.0), img);
    }

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut img = PixelBuffer::transparent(5, 5);
        let i = (2 * 5 + 2) * 4;
        img.data_mut()[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        let out = blur(&img, 1.0);
        assert!(out.pixel(2, 2)[3] < 255);
        assert!(out.pixel(1, 2)[3] > 0);
        assert_eq!(out.pixel(0, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_wrong_weight_count() {
        let img = PixelBuffer::filled(2, 2, [1, 2, 3, 4]);
        let params = SCHEMA.resolve(&json!({ "radius": 2 })).unwrap();
        let block = pack(&GAUSSIAN_BLUR_LAYOUT, &params, (2, 2)).unwrap();
        assert!(run(&img, &block, &[1.0]).is_err());
    }
}
