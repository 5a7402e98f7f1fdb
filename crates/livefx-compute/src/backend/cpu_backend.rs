//! CPU backend.
//!
//! Runs the reference kernels with rayon. It consumes the same padded,
//! aligned image and packed uniform block the GPU would see, so results match
//! the wgpu backend up to sampler filtering precision.

use tracing::trace;

use super::{GpuLimits, KernelBackend, PrepareFn, Readback};
use crate::kernels::{self, KernelKind, KernelSpec};
use crate::{ComputeError, ComputeResult};

pub struct CpuBackend {
    limits: GpuLimits,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self { limits: GpuLimits::from_env() }
    }

    /// CPU backend enforcing the given limits.
    pub fn with_limits(limits: GpuLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &GpuLimits {
        &self.limits
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn dispatch(
        &self,
        effect_id: &str,
        kernel: &'static KernelSpec,
        prepare: &mut PrepareFn<'_>,
    ) -> ComputeResult<Readback> {
        let prepared = prepare(&self.limits)?;
        trace!(
            effect = effect_id,
            kernel = kernel.name,
            w = prepared.image.width(),
            h = prepared.image.height(),
            "cpu::dispatch"
        );

        let image = match kernel.kind {
            KernelKind::GaussianBlur => {
                let weights = prepared.weights.as_deref().ok_or_else(|| {
                    ComputeError::Core(livefx_core::Error::schema("weights", "gaussian kernel needs a weight field"))
                })?;
                kernels::gaussian_blur_cpu(&prepared.image, &prepared.uniforms, weights)?
            }
            KernelKind::DirectionalBlur => kernels::directional_blur_cpu(&prepared.image, &prepared.uniforms)?,
            KernelKind::ChromaticAberration => {
                kernels::chromatic_aberration_cpu(&prepared.image, &prepared.uniforms)?
            }
        };
        Ok(Readback { image, plan: prepared.plan })
    }

    fn invalidate(&self, _effect_id: &str) {}

    fn device_limits(&self, _effect_id: &str) -> GpuLimits {
        self.limits.clone()
    }
}
