//! PNG input/output.
//!
//! Everything is converted to 8-bit RGBA on read; 16-bit channels keep their
//! high byte.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, bail};
use livefx_core::PixelBuffer;
use tracing::debug;

/// Reads a PNG as RGBA8.
pub fn read_png(path: &Path) -> Result<PixelBuffer> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Failed to decode: {}", path.display()))?;

    let buf_size = reader
        .output_buffer_size()
        .context("cannot determine PNG output buffer size")?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .with_context(|| format!("Failed to decode: {}", path.display()))?;
    let bytes = &buf[..info.buffer_size()];
    debug!(path = %path.display(), w = info.width, h = info.height, color = ?info.color_type, depth = ?info.bit_depth, "png::read");

    let rgba = match (info.color_type, info.bit_depth) {
        (png::ColorType::Rgba, png::BitDepth::Eight) => bytes.to_vec(),
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            bytes.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect()
        }
        (png::ColorType::Grayscale, png::BitDepth::Eight) => bytes.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
            bytes.chunks_exact(2).flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]]).collect()
        }
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => bytes.chunks_exact(2).map(|c| c[0]).collect(),
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => bytes
            .chunks_exact(6)
            .flat_map(|p| [p[0], p[2], p[4], 255])
            .collect(),
        (color_type, bit_depth) => bail!("unsupported PNG format: {color_type:?} {bit_depth:?}"),
    };

    Ok(PixelBuffer::new(info.width, info.height, rgba)?)
}

/// Writes an RGBA8 PNG.
pub fn write_png(path: &Path, image: &PixelBuffer) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    writer
        .write_image_data(image.data())
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    debug!(path = %path.display(), w = image.width(), h = image.height(), "png::write");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        let mut img = PixelBuffer::transparent(3, 2);
        img.data_mut()[4..8].copy_from_slice(&[10, 20, 30, 40]);

        write_png(&path, &img).unwrap();
        assert_eq!(read_png(&path).unwrap(), img);
    }

    #[test]
    fn test_missing_file() {
        let err = read_png(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
