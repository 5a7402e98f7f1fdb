//! Kernel backends.
//!
//! # Architecture
//!
//! ```text
//! Executor
//!     +-- CpuBackend  (rayon reference kernels)
//!     +-- WgpuBackend (Vulkan/Metal/DX12 compute, per-effect PipelineCache)
//! ```
//!
//! A backend first exposes its [`GpuLimits`] to the executor's `prepare`
//! callback, which validates the canvas and produces the padded, aligned
//! image plus packed uniforms. The backend then dispatches the kernel and
//! returns the aligned result together with the plan needed to crop it.

pub mod cache;
mod cpu_backend;
mod limits;

#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cache::{CachedContext, PipelineCache, SlotStatus};
pub use cpu_backend::CpuBackend;
pub use limits::GpuLimits;

#[cfg(feature = "wgpu")]
pub use wgpu_backend::{ComputeContext, WgpuBackend};

use livefx_core::{AlignmentPlan, PixelBuffer};

use crate::config::PowerPreference;
use crate::kernels::KernelSpec;
use crate::layout::UniformBlock;
use crate::ComputeResult;
#[cfg(not(feature = "wgpu"))]
use crate::ComputeError;

/// Available compute backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// wgpu when an adapter is present, CPU otherwise.
    #[default]
    Auto,
    /// CPU backend using rayon for parallelization.
    Cpu,
    /// wgpu backend (Vulkan/Metal/DX12).
    Wgpu,
}

impl Backend {
    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto | Self::Cpu => true,
            #[cfg(feature = "wgpu")]
            Self::Wgpu => WgpuBackend::is_available(),
            #[cfg(not(feature = "wgpu"))]
            Self::Wgpu => false,
        }
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Wgpu => "wgpu",
        }
    }

    /// Parses `auto`, `cpu` or `wgpu` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "cpu" => Some(Self::Cpu),
            "wgpu" | "gpu" => Some(Self::Wgpu),
            _ => None,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch-ready inputs produced by the executor.
pub struct Prepared {
    /// Padded and aligned image.
    pub image: PixelBuffer,
    pub plan: AlignmentPlan,
    pub uniforms: UniformBlock,
    /// Weight field for buffer kernels that take one.
    pub weights: Option<Vec<f32>>,
}

/// Aligned kernel output plus the plan that crops it.
pub struct Readback {
    pub image: PixelBuffer,
    pub plan: AlignmentPlan,
}

/// Callback that turns device limits into dispatch inputs.
pub type PrepareFn<'a> = dyn FnMut(&GpuLimits) -> ComputeResult<Prepared> + 'a;

/// A device that can run kernels.
pub trait KernelBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Acquires the effect's context, calls `prepare` with its limits and runs `kernel`.
    fn dispatch(
        &self,
        effect_id: &str,
        kernel: &'static KernelSpec,
        prepare: &mut PrepareFn<'_>,
    ) -> ComputeResult<Readback>;

    /// Drops any cached state for `effect_id`.
    fn invalidate(&self, effect_id: &str);

    /// Limits `effect_id` would dispatch under right now.
    fn device_limits(&self, effect_id: &str) -> GpuLimits;
}

/// Creates a backend instance.
pub fn create_backend(backend: Backend, power: PowerPreference) -> ComputeResult<Box<dyn KernelBackend>> {
    match backend {
        Backend::Auto => {
            if Backend::Wgpu.is_available() {
                create_backend(Backend::Wgpu, power)
            } else {
                tracing::info!("no GPU adapter, using CPU backend");
                create_backend(Backend::Cpu, power)
            }
        }
        Backend::Cpu => Ok(Box::new(CpuBackend::new())),
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                Ok(Box::new(WgpuBackend::new(power)))
            }
            #[cfg(not(feature = "wgpu"))]
            {
                let _ = power;
                Err(ComputeError::BackendNotAvailable(
                    "wgpu feature not enabled".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("CPU"), Some(Backend::Cpu));
        assert_eq!(Backend::parse(" auto "), Some(Backend::Auto));
        assert_eq!(Backend::parse("wgpu"), Some(Backend::Wgpu));
        assert_eq!(Backend::parse("cuda"), None);
    }

    #[cfg(not(feature = "wgpu"))]
    #[test]
    fn test_wgpu_needs_feature() {
        assert!(!Backend::Wgpu.is_available());
        let err = create_backend(Backend::Wgpu, PowerPreference::default()).err().unwrap();
        assert!(matches!(err, ComputeError::BackendNotAvailable(_)));
    }

    #[test]
    fn test_cpu_always_available() {
        assert!(Backend::Cpu.is_available());
        let b = create_backend(Backend::Cpu, PowerPreference::default()).unwrap();
        assert_eq!(b.name(), "cpu");
    }
}
