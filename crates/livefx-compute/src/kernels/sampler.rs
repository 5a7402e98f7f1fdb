//! CPU emulation of texture access.
//!
//! Mirrors what the texture kernels get from the GPU: rgba8unorm texels read
//! as `[0, 1]` floats, a linear clamp-to-edge sampler addressed in normalized
//! coordinates, and rounding stores into an rgba8unorm target.

pub(crate) type Rgba = [f32; 4];

/// Read-only RGBA8 view.
pub(crate) struct Texture<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Texture<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self { width, height, data }
    }

    pub fn dims(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// `textureLoad` with coordinates clamped to the edge.
    pub fn load(&self, x: i64, y: i64) -> Rgba {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        let px = &self.data[i..i + 4];
        [unorm(px[0]), unorm(px[1]), unorm(px[2]), unorm(px[3])]
    }

    /// Bilinear `textureSampleLevel` at normalized `(u, v)`.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let top = mix(self.load(x0, y0), self.load(x0 + 1, y0), fx);
        let bottom = mix(self.load(x0, y0 + 1), self.load(x0 + 1, y0 + 1), fx);
        mix(top, bottom, fy)
    }
}

#[inline]
pub(crate) fn unorm(v: u8) -> f32 {
    v as f32 / 255.0
}

/// rgba8unorm store conversion.
#[inline]
pub(crate) fn store(c: Rgba) -> [u8; 4] {
    c.map(|v| (0.5 + 255.0 * v.clamp(0.0, 1.0)).floor() as u8)
}

#[inline]
pub(crate) fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[inline]
pub(crate) fn add_scaled(acc: &mut Rgba, c: Rgba, w: f32) {
    for (a, v) in acc.iter_mut().zip(c) {
        *a += v * w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_at_texel_center_is_exact() {
        let data = [0, 0, 0, 255, 255, 255, 255, 255];
        let tex = Texture::new(2, 1, &data);
        assert_eq!(tex.sample(0.25, 0.5), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(tex.sample(0.75, 0.5), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_sample_between_texels() {
        let data = [0, 0, 0, 0, 255, 255, 255, 255];
        let tex = Texture::new(2, 1, &data);
        let mid = tex.sample(0.5, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_to_edge() {
        let data = [10, 20, 30, 40, 200, 200, 200, 200];
        let tex = Texture::new(2, 1, &data);
        assert_eq!(tex.sample(-3.0, 0.5), tex.load(0, 0));
        assert_eq!(tex.sample(5.0, 7.0), tex.load(1, 0));
    }

    #[test]
    fn test_store_rounds() {
        assert_eq!(store([0.0, 1.0, 2.0, -1.0]), [0, 255, 255, 0]);
        assert_eq!(store([unorm(17), unorm(128), 0.5, 0.499]), [17, 128, 128, 127]);
    }
}
