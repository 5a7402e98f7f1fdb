//! Compute backends for livefx kernels.
//!
//! Runs the per-pixel effect kernels either on a GPU through wgpu or on the
//! CPU through a rayon reference implementation of the same math.
//!
//! # Architecture
//!
//! ```text
//! Executor (pad -> align -> pack -> dispatch -> unalign)
//!     └── KernelBackend
//!             ├── CpuBackend  (rayon, emulates sampler + unorm stores)
//!             └── WgpuBackend (compute shaders, per-effect PipelineCache)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use livefx_compute::{Executor, EngineConfig, Invocation, kernels};
//!
//! let exec = Executor::new(EngineConfig::from_env())?;
//! let out = exec.run("directional-blur-v1", &Invocation::new(&kernels::DIRECTIONAL_BLUR, &params, 5), &image)?;
//! ```

pub mod backend;
pub mod config;
pub mod executor;
pub mod kernels;
pub mod layout;
mod shaders;

pub use backend::{Backend, GpuLimits, KernelBackend, Prepared, Readback, create_backend};
pub use config::{Diagnostics, EngineBuilder, EngineConfig, PowerPreference};
pub use executor::{Executor, Invocation, WeightField, workgroup_grid};
pub use kernels::{KernelBinding, KernelKind, KernelSpec};
pub use layout::{FieldKind, UniformBlock, UniformField, UniformLayout};

use thiserror::Error;

/// Kernel execution errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("pipeline build failed for '{effect}': {reason}")]
    PipelineBuildFailed { effect: String, reason: String },

    #[error("device lost while running '{effect}'")]
    DeviceLost { effect: String },

    #[error("out of device memory in '{effect}': {reason}")]
    OutOfDeviceMemory { effect: String, reason: String },

    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error(transparent)]
    Core(#[from] livefx_core::Error),
}

impl ComputeError {
    /// True if the caller may retry the invocation once.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceLost { .. })
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;
