//! Device resource limits.

use std::sync::OnceLock;

/// Limits a dispatch must fit into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuLimits {
    /// Maximum texture dimension (width or height).
    pub max_texture_dim: u32,
    /// Maximum buffer size in bytes.
    pub max_buffer_bytes: u64,
    /// Maximum storage buffer binding size in bytes.
    pub max_storage_buffer_bytes: u64,
}

impl Default for GpuLimits {
    fn default() -> Self {
        Self {
            max_texture_dim: 16384,
            max_buffer_bytes: 256 * 1024 * 1024,         // 256 MB
            max_storage_buffer_bytes: 128 * 1024 * 1024, // 128 MB
        }
    }
}

impl GpuLimits {
    /// Default limits, with `LIVEFX_MAX_TEXTURE_DIM` applied if set.
    pub fn from_env() -> Self {
        let mut limits = Self::default();
        if let Some(dim) = max_texture_dim_override() {
            limits.max_texture_dim = dim;
        }
        limits
    }

    /// Caps `max_texture_dim` with the env override, if any.
    pub fn with_env_override(mut self) -> Self {
        if let Some(dim) = max_texture_dim_override() {
            self.max_texture_dim = self.max_texture_dim.min(dim);
        }
        self
    }

    /// Byte size of a `width x height` RGBA8 canvas.
    pub fn canvas_bytes(width: u64, height: u64) -> u64 {
        width * height * 4
    }
}

fn max_texture_dim_override() -> Option<u32> {
    static OVERRIDE: OnceLock<Option<u32>> = OnceLock::new();
    *OVERRIDE.get_or_init(|| {
        std::env::var("LIVEFX_MAX_TEXTURE_DIM")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
    })
}
