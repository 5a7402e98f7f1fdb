//! Error types for livefx-core operations.
//!
//! The [`Error`] enum covers failures that can be detected without touching
//! a GPU:
//! - parameter state that does not satisfy an effect's schema
//! - pixel buffers whose length disagrees with their declared size
//! - canvases that would exceed a device limit once padded and aligned
//! - crops that cannot be the inverse of a pad
//!
//! # Usage
//!
//! ```rust
//! use livefx_core::{Error, Result};
//!
//! fn check_len(width: u32, height: u32, data: &[u8]) -> Result<()> {
//!     let expected = width as usize * height as usize * 4;
//!     if data.len() != expected {
//!         return Err(Error::BufferSizeMismatch { expected, actual: data.len() });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by pixel, geometry and parameter handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A parameter is missing, has the wrong type, or names an unknown enum option.
    ///
    /// `field` is the parameter name, or `"<state>"` when the whole state
    /// document is malformed.
    #[error("parameter '{field}' violates schema: {reason}")]
    SchemaViolation {
        /// Offending parameter name.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Pixel data length does not equal `width * height * 4`.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// The padded and aligned canvas exceeds the device's maximum dimension.
    #[error("canvas {width}x{height} exceeds device limit {limit}")]
    ResourceLimitExceeded {
        /// Final canvas width.
        width: u64,
        /// Final canvas height.
        height: u64,
        /// Maximum dimension (or byte size for buffer limits).
        limit: u64,
    },

    /// A crop cannot be applied to the given image.
    #[error("cannot crop {width}x{height} image to {target_width}x{target_height}")]
    GeometryMismatch {
        /// Width of the image being cropped.
        width: u32,
        /// Height of the image being cropped.
        height: u32,
        /// Requested width.
        target_width: u32,
        /// Requested height.
        target_height: u32,
    },
}

impl Error {
    /// Shorthand for [`Error::SchemaViolation`].
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_field() {
        let err = Error::schema("blurMode", "unknown option 'sideways'");
        let msg = err.to_string();
        assert!(msg.contains("blurMode"));
        assert!(msg.contains("sideways"));
    }

    #[test]
    fn test_buffer_mismatch_display() {
        let err = Error::BufferSizeMismatch { expected: 400, actual: 399 };
        assert_eq!(err.to_string(), "buffer size mismatch: expected 400 bytes, got 399");
    }
}
