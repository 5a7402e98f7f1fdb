//! Dispatch executor.
//!
//! Turns one effect invocation into one kernel dispatch:
//!
//! ```text
//! pad(margin) -> check limits -> pack uniforms -> align -> dispatch -> unalign
//! ```
//!
//! Limits are checked against the backend's device before any pixel buffer
//! or weight field is allocated, so an oversized canvas fails with
//! `ResourceLimitExceeded` rather than being truncated.

use std::time::Instant;

use livefx_core::geometry::{align_for_dispatch, aligned_extent, check_extent, pad, padded_extent, unalign};
use livefx_core::{Error, ParameterSet, PixelBuffer};
use tracing::{debug, trace};

use crate::backend::{CpuBackend, GpuLimits, KernelBackend, Prepared, create_backend};
use crate::config::{Diagnostics, EngineConfig};
use crate::kernels::{KernelBinding, KernelSpec, gaussian_weight_count, gaussian_weights};
use crate::layout::pack;
use crate::ComputeResult;

/// Number of workgroups covering a `width x height` canvas.
#[inline]
pub fn workgroup_grid(width: u32, height: u32, workgroup: (u32, u32)) -> (u32, u32) {
    (width.div_ceil(workgroup.0.max(1)), height.div_ceil(workgroup.1.max(1)))
}

/// Weight field for buffer kernels.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightField {
    /// Precomputed weights.
    Values(Vec<f32>),
    /// Gaussian field for a blur radius, built only once the canvas fits.
    Gaussian(f32),
}

impl WeightField {
    /// Number of weights, or `None` when the count overflows `u64`.
    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Values(v) => Some(v.len() as u64),
            Self::Gaussian(radius) => gaussian_weight_count(*radius),
        }
    }

    fn build(&self) -> Vec<f32> {
        match self {
            Self::Values(v) => v.clone(),
            Self::Gaussian(radius) => gaussian_weights(*radius),
        }
    }
}

/// One kernel run: which kernel, with what parameters, on how much overflow.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub kernel: &'static KernelSpec,
    pub params: &'a ParameterSet,
    /// Transparent border added on every side before dispatch.
    pub margin: u32,
    /// Weight field for kernels that take one.
    pub weights: Option<WeightField>,
}

impl<'a> Invocation<'a> {
    pub fn new(kernel: &'static KernelSpec, params: &'a ParameterSet, margin: u32) -> Self {
        Self { kernel, params, margin, weights: None }
    }

    pub fn with_weights(mut self, weights: Vec<f32>) -> Self {
        self.weights = Some(WeightField::Values(weights));
        self
    }

    /// Gaussian weights for `radius`, sized against the device before they are built.
    pub fn with_gaussian(mut self, radius: f32) -> Self {
        self.weights = Some(WeightField::Gaussian(radius));
        self
    }
}

/// Runs kernels on a backend.
pub struct Executor {
    backend: Box<dyn KernelBackend>,
    diagnostics: Diagnostics,
}

impl Executor {
    /// Creates an executor on the configured backend.
    pub fn new(config: EngineConfig) -> ComputeResult<Self> {
        let backend = create_backend(config.backend, config.power)?;
        if config.diagnostics.enabled {
            debug!(backend = backend.name(), "executor ready");
        }
        Ok(Self { backend, diagnostics: config.diagnostics })
    }

    /// CPU executor with default diagnostics.
    pub fn cpu() -> Self {
        Self::with_backend(Box::new(CpuBackend::new()), Diagnostics::default())
    }

    pub fn with_backend(backend: Box<dyn KernelBackend>, diagnostics: Diagnostics) -> Self {
        Self { backend, diagnostics }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Drops cached device state for `effect_id`.
    pub fn invalidate(&self, effect_id: &str) {
        self.backend.invalidate(effect_id);
    }

    /// Checks that `image` grown by `margin` would fit the device `kernel` runs on.
    ///
    /// For effects that skip the kernel but still return a padded canvas.
    pub fn check_canvas(
        &self,
        effect_id: &str,
        kernel: &'static KernelSpec,
        width: u32,
        height: u32,
        margin: u32,
    ) -> ComputeResult<()> {
        let (pw, ph) = padded_extent(width, height, margin);
        fit_canvas(kernel, &self.backend.device_limits(effect_id), pw, ph, None)?;
        Ok(())
    }

    /// Runs `invocation` over `image` and returns the padded result.
    ///
    /// The output is `image` grown by `margin` on every side; alignment
    /// padding never leaks into it.
    pub fn run(&self, effect_id: &str, invocation: &Invocation<'_>, image: &PixelBuffer) -> ComputeResult<PixelBuffer> {
        let kernel = invocation.kernel;
        let margin = invocation.margin;
        trace!(
            effect = effect_id,
            kernel = kernel.name,
            w = image.width(),
            h = image.height(),
            margin,
            "Executor::run"
        );

        let (pw, ph) = padded_extent(image.width(), image.height(), margin);
        if pw == 0 || ph == 0 {
            // margin is 0 here, so both fit in u32
            debug!(effect = effect_id, "zero-area canvas, skipping dispatch");
            return Ok(PixelBuffer::transparent(pw as u32, ph as u32));
        }

        let start = Instant::now();
        let mut prepare = |limits: &GpuLimits| -> ComputeResult<Prepared> {
            fit_canvas(kernel, limits, pw, ph, invocation.weights.as_ref())?;

            let weights = invocation.weights.as_ref().map(WeightField::build);
            let padded = pad(image, margin)?;
            let uniforms = pack(kernel.layout, invocation.params, (padded.width(), padded.height()))?;
            let (aligned, plan) = align_for_dispatch(&padded, kernel.granularity())?;
            Ok(Prepared {
                image: aligned,
                plan,
                uniforms,
                weights,
            })
        };

        let readback = self.backend.dispatch(effect_id, kernel, &mut prepare)?;
        let out = unalign(&readback.image, &readback.plan)?;

        if self.diagnostics.timings_enabled() {
            debug!(
                effect = effect_id,
                backend = self.backend.name(),
                w = out.width(),
                h = out.height(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "dispatch complete"
            );
        }
        Ok(out)
    }
}

/// Validates a padded `width x height` canvas and its weight field against
/// `limits`, before anything is allocated.
fn fit_canvas(
    kernel: &KernelSpec,
    limits: &GpuLimits,
    width: u64,
    height: u64,
    weights: Option<&WeightField>,
) -> Result<(), Error> {
    let (aw, ah) = aligned_extent(width, height, kernel.granularity());
    check_extent(aw, ah, limits.max_texture_dim)?;
    check_bytes(kernel, limits, aw, ah, weights)
}

/// Rejects canvases whose buffers would exceed the device's byte limits.
fn check_bytes(
    kernel: &KernelSpec,
    limits: &GpuLimits,
    width: u64,
    height: u64,
    weights: Option<&WeightField>,
) -> Result<(), Error> {
    let bytes = GpuLimits::canvas_bytes(width, height);
    let limit = match kernel.binding {
        KernelBinding::Texture => limits.max_buffer_bytes,
        KernelBinding::Buffer => limits.max_storage_buffer_bytes.min(limits.max_buffer_bytes),
    };
    if bytes > limit {
        return Err(Error::ResourceLimitExceeded { width, height, limit });
    }
    let weight_bytes = match weights {
        None => Some(0),
        Some(field) => field.count().and_then(|n| n.checked_mul(4)),
    };
    match weight_bytes {
        Some(n) if n <= limits.max_storage_buffer_bytes => Ok(()),
        _ => Err(Error::ResourceLimitExceeded {
            width,
            height,
            limit: limits.max_storage_buffer_bytes,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{self, gaussian_weights};
    use livefx_core::ParamValue;

    #[test]
    fn test_workgroup_grid() {
        assert_eq!(workgroup_grid(256, 256, (16, 16)), (16, 16));
        assert_eq!(workgroup_grid(257, 1, (16, 16)), (17, 1));
        assert_eq!(workgroup_grid(10, 10, (8, 8)), (2, 2));
        assert_eq!(workgroup_grid(0, 5, (8, 8)), (0, 1));
    }

    #[test]
    fn test_gaussian_grows_by_margin() {
        let exec = Executor::cpu();
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(2.0));
        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 2).with_weights(gaussian_weights(2.0));
        let img = PixelBuffer::filled(5, 3, [255, 0, 0, 255]);

        let out = exec.run("blur-v1", &inv, &img).unwrap();
        assert_eq!((out.width(), out.height()), (9, 7));
        assert_eq!(out.data().len(), 9 * 7 * 4);
    }

    #[test]
    fn test_texture_kernel_alignment_is_removed() {
        let exec = Executor::cpu();
        let params: ParameterSet = [
            ("strength", ParamValue::Real(0.0)),
            ("angle", ParamValue::Real(0.0)),
            ("opacity", ParamValue::Real(100.0)),
            ("blurMode", ParamValue::String("both".into())),
            ("fadeOut", ParamValue::Real(0.0)),
            ("fadeDirection", ParamValue::Real(0.0)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let inv = Invocation::new(&kernels::DIRECTIONAL_BLUR, &params, 0);
        let img = PixelBuffer::filled(70, 3, [10, 20, 30, 255]);

        let out = exec.run("directional-blur-v1", &inv, &img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_limit_checked_before_dispatch() {
        let limits = GpuLimits { max_texture_dim: 64, ..GpuLimits::default() };
        let exec = Executor::with_backend(Box::new(CpuBackend::with_limits(limits)), Diagnostics::default());
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(1.0));
        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 1).with_weights(gaussian_weights(1.0));
        let img = PixelBuffer::transparent(63, 10);

        let err = exec.run("blur-v1", &inv, &img).unwrap_err();
        assert!(matches!(
            err,
            crate::ComputeError::Core(Error::ResourceLimitExceeded { width: 65, limit: 64, .. })
        ));
    }

    #[test]
    fn test_byte_limit() {
        let limits = GpuLimits { max_storage_buffer_bytes: 16, ..GpuLimits::default() };
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(0.5));
        let exec = Executor::with_backend(Box::new(CpuBackend::with_limits(limits)), Diagnostics::default());
        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 0).with_weights(gaussian_weights(0.5));
        let img = PixelBuffer::transparent(3, 3);
        assert!(exec.run("blur-v1", &inv, &img).is_err());
    }

    #[test]
    fn test_gaussian_field_built_after_limit_check() {
        let exec = Executor::cpu();
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(1.0e9));
        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 1_000_000_000).with_gaussian(1.0e9);
        let err = exec.run("blur-v1", &inv, &PixelBuffer::filled(1, 1, [255; 4])).unwrap_err();
        assert!(matches!(err, crate::ComputeError::Core(Error::ResourceLimitExceeded { .. })));
    }

    #[test]
    fn test_gaussian_field_over_storage_limit() {
        // 3x3 canvas fits, 25 weights do not
        let limits = GpuLimits { max_storage_buffer_bytes: 64, ..GpuLimits::default() };
        let exec = Executor::with_backend(Box::new(CpuBackend::with_limits(limits)), Diagnostics::default());
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(2.0));
        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 0).with_gaussian(2.0);
        let err = exec.run("blur-v1", &inv, &PixelBuffer::transparent(3, 1)).unwrap_err();
        assert!(matches!(err, crate::ComputeError::Core(Error::ResourceLimitExceeded { limit: 64, .. })));
    }

    #[test]
    fn test_gaussian_field_matches_precomputed() {
        let exec = Executor::cpu();
        let mut params = ParameterSet::new();
        params.insert("radius", ParamValue::Real(1.5));
        let mut img = PixelBuffer::transparent(6, 6);
        img.data_mut()[56..60].copy_from_slice(&[255, 128, 0, 255]);
        let lazy = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 2).with_gaussian(1.5);
        let eager = Invocation::new(&kernels::GAUSSIAN_BLUR, &params, 2).with_weights(gaussian_weights(1.5));
        assert_eq!(exec.run("blur-v1", &lazy, &img).unwrap(), exec.run("blur-v1", &eager, &img).unwrap());
    }

    #[test]
    fn test_check_canvas() {
        let limits = GpuLimits { max_texture_dim: 64, ..GpuLimits::default() };
        let exec = Executor::with_backend(Box::new(CpuBackend::with_limits(limits)), Diagnostics::default());
        let kernel = &kernels::CHROMATIC_ABERRATION;
        assert!(exec.check_canvas("chromatic-aberration-v1", kernel, 60, 60, 2).is_ok());
        let err = exec.check_canvas("chromatic-aberration-v1", kernel, 60, 60, 3).unwrap_err();
        assert!(matches!(
            err,
            crate::ComputeError::Core(Error::ResourceLimitExceeded { width: 128, limit: 64, .. })
        ));
    }

    #[test]
    fn test_zero_area_short_circuits() {
        let exec = Executor::cpu();
        let params = ParameterSet::new();
        let inv = Invocation::new(&kernels::CHROMATIC_ABERRATION, &params, 0);
        let out = exec.run("chromatic-aberration-v1", &inv, &PixelBuffer::transparent(0, 4)).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.height(), 4);
    }
}
