//! Canvas geometry for dispatch.
//!
//! Two kinds of padding are applied before a kernel runs:
//!
//! - **Overflow padding** ([`pad`]): a transparent margin on every side so an
//!   effect can spill past the original bounds. It is kept in the result.
//! - **Alignment padding** ([`align_for_dispatch`]): transparent pixels on
//!   the right and bottom so the row stride meets the backend's copy
//!   granularity. It is always removed again with [`unalign`].
//!
//! All size arithmetic is done in `u64` and validated with [`check_extent`]
//! before any buffer is allocated.

use tracing::trace;

use crate::pixel::{BYTES_PER_PIXEL, PixelBuffer};
use crate::{Error, Result};

/// Row pitch alignment required for texture-to-buffer copies.
pub const COPY_ROW_ALIGNMENT_BYTES: u32 = 256;

/// Pixel granularity that makes an RGBA8 row meet [`COPY_ROW_ALIGNMENT_BYTES`].
pub const TEXTURE_ROW_GRANULARITY: u32 = COPY_ROW_ALIGNMENT_BYTES / BYTES_PER_PIXEL as u32;

/// Record of the alignment padding added to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentPlan {
    pub original_width: u32,
    pub original_height: u32,
    pub pad_right: u32,
    pub pad_bottom: u32,
    pub granularity: u32,
}

impl AlignmentPlan {
    /// Width after alignment.
    pub fn aligned_width(&self) -> u32 {
        self.original_width + self.pad_right
    }

    /// Height after alignment.
    pub fn aligned_height(&self) -> u32 {
        self.original_height + self.pad_bottom
    }

    /// True if alignment added no pixels.
    pub fn is_identity(&self) -> bool {
        self.pad_right == 0 && self.pad_bottom == 0
    }
}

/// Size after adding `margin` on every side.
pub fn padded_extent(width: u32, height: u32, margin: u32) -> (u64, u64) {
    let m = 2 * margin as u64;
    (width as u64 + m, height as u64 + m)
}

/// Size after rounding up to a multiple of `granularity`.
///
/// Granularity 0 or 1 leaves the size unchanged.
pub fn aligned_extent(width: u64, height: u64, granularity: u32) -> (u64, u64) {
    if granularity <= 1 {
        return (width, height);
    }
    let g = granularity as u64;
    (width.div_ceil(g) * g, height.div_ceil(g) * g)
}

/// Validates a canvas size against a device's maximum dimension.
pub fn check_extent(width: u64, height: u64, max_dim: u32) -> Result<(u32, u32)> {
    let limit = max_dim as u64;
    if width > limit || height > limit || width > u32::MAX as u64 || height > u32::MAX as u64 {
        return Err(Error::ResourceLimitExceeded { width, height, limit });
    }
    Ok((width as u32, height as u32))
}

/// Grows the canvas by `margin` on every side, centering the original.
pub fn pad(image: &PixelBuffer, margin: u32) -> Result<PixelBuffer> {
    if margin == 0 {
        return Ok(image.clone());
    }
    let (w, h) = padded_extent(image.width(), image.height(), margin);
    let (w, h) = check_extent(w, h, u32::MAX)?;
    trace!(margin, width = w, height = h, "geometry::pad");

    let mut out = PixelBuffer::transparent(w, h);
    blit(image, &mut out, margin, margin);
    Ok(out)
}

/// Crops the centered `original_width x original_height` window.
///
/// Exact inverse of [`pad`].
pub fn unpad(image: &PixelBuffer, original_width: u32, original_height: u32) -> Result<PixelBuffer> {
    let (w, h) = (image.width(), image.height());
    let dw = w.checked_sub(original_width);
    let dh = h.checked_sub(original_height);
    match (dw, dh) {
        (Some(dw), Some(dh)) if dw % 2 == 0 && dh % 2 == 0 => {
            Ok(crop(image, dw / 2, dh / 2, original_width, original_height))
        }
        _ => Err(Error::GeometryMismatch {
            width: w,
            height: h,
            target_width: original_width,
            target_height: original_height,
        }),
    }
}

/// Pads right and bottom so both dimensions are multiples of `granularity`.
pub fn align_for_dispatch(image: &PixelBuffer, granularity: u32) -> Result<(PixelBuffer, AlignmentPlan)> {
    let (w, h) = aligned_extent(image.width() as u64, image.height() as u64, granularity);
    let (w, h) = check_extent(w, h, u32::MAX)?;
    let plan = AlignmentPlan {
        original_width: image.width(),
        original_height: image.height(),
        pad_right: w - image.width(),
        pad_bottom: h - image.height(),
        granularity,
    };
    if plan.is_identity() {
        return Ok((image.clone(), plan));
    }
    trace!(
        pad_right = plan.pad_right,
        pad_bottom = plan.pad_bottom,
        granularity,
        "geometry::align_for_dispatch"
    );

    let mut out = PixelBuffer::transparent(w, h);
    blit(image, &mut out, 0, 0);
    Ok((out, plan))
}

/// Removes the padding recorded in `plan`.
pub fn unalign(image: &PixelBuffer, plan: &AlignmentPlan) -> Result<PixelBuffer> {
    if image.width() != plan.aligned_width() || image.height() != plan.aligned_height() {
        return Err(Error::GeometryMismatch {
            width: image.width(),
            height: image.height(),
            target_width: plan.original_width,
            target_height: plan.original_height,
        });
    }
    if plan.is_identity() {
        return Ok(image.clone());
    }
    Ok(crop(image, 0, 0, plan.original_width, plan.original_height))
}

/// Copies `src` into `dst` with its top-left corner at `(x, y)`.
fn blit(src: &PixelBuffer, dst: &mut PixelBuffer, x: u32, y: u32) {
    let row = src.stride();
    let dst_stride = dst.stride();
    let x_off = x as usize * BYTES_PER_PIXEL;
    let src_data = src.data();
    let dst_data = dst.data_mut();
    for (row_idx, src_row) in src_data.chunks_exact(row.max(1)).enumerate() {
        let start = (y as usize + row_idx) * dst_stride + x_off;
        dst_data[start..start + row].copy_from_slice(src_row);
    }
}

/// Crops a window; caller guarantees it lies inside the image.
fn crop(image: &PixelBuffer, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
    let mut out = PixelBuffer::transparent(width, height);
    let row = out.stride();
    let src_stride = image.stride();
    let x_off = x as usize * BYTES_PER_PIXEL;
    let src = image.data();
    for (row_idx, dst_row) in out.data_mut().chunks_exact_mut(row.max(1)).enumerate() {
        let start = (y as usize + row_idx) * src_stride + x_off;
        dst_row.copy_from_slice(&src[start..start + row]);
    }
    out
}
