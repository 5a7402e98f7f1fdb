//! Gaussian blur (`blur-v1`).

use livefx_compute::kernels::{self, kernel_radius};
use livefx_compute::{Executor, Invocation};
use livefx_core::{
    EffectDescriptor, ParamSchema, ParamSpec, ParameterSet, PixelBuffer, StyleFeature, StyleFilterFlag,
    StyleFilterFlags, Version,
};
use tracing::trace;

use crate::error::EffectResult;
use crate::traits::LiveEffect;
use crate::ui::{self, DataType, UiNode};

pub const ID: &str = "blur-v1";

static DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    id: ID,
    title: "Gaussian Blur V1",
    version: Version { major: 1, minor: 0 },
    style_filter_flags: StyleFilterFlags {
        main: StyleFilterFlag::PostEffectFilter,
        features: &[StyleFeature::ScaleParams],
    },
    schema: ParamSchema::new(&[("radius", ParamSpec::Real { default: 1.0 })]),
};

/// Isotropic blur with a normalized 2-D Gaussian field.
///
/// The canvas grows by the integer radius on every side so the blur can
/// spill past the original bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlur;

impl LiveEffect for GaussianBlur {
    fn descriptor(&self) -> &'static EffectDescriptor {
        &DESCRIPTOR
    }

    fn spatial_fields(&self) -> &'static [&'static str] {
        &["radius"]
    }

    fn render_ui(&self, params: &ParameterSet) -> UiNode {
        ui::col(vec![
            ui::text("Radius (px)"),
            ui::slider("radius", "Radius", DataType::Float, (0.0, 100.0), params.real("radius").unwrap_or(1.0)),
        ])
    }

    fn go_live_effect(&self, engine: &Executor, params: &ParameterSet, image: PixelBuffer) -> EffectResult<PixelBuffer> {
        let radius = params.real("radius")? as f32;
        let r = kernel_radius(radius);
        trace!(radius, r, w = image.width(), h = image.height(), "GaussianBlur::go_live_effect");
        if r == 0 {
            return Ok(image);
        }

        let inv = Invocation::new(&kernels::GAUSSIAN_BLUR, params, r).with_gaussian(radius);
        Ok(engine.run(ID, &inv, &image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_radius_is_identity() {
        let img = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        let params = DESCRIPTOR.schema.resolve(&serde_json::json!({ "radius": 0 })).unwrap();
        let out = GaussianBlur.go_live_effect(&Executor::cpu(), &params, img.clone()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_canvas_grows_by_radius() {
        let img = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
        let params = DESCRIPTOR.schema.resolve(&serde_json::json!({ "radius": 2.5 })).unwrap();
        let out = GaussianBlur.go_live_effect(&Executor::cpu(), &params, img).unwrap();
        assert_eq!((out.width(), out.height()), (10, 10));
        // corners reach the image only through the outermost taps
        assert!(out.pixel(0, 0)[3] < 5);
        assert!(out.pixel(5, 5)[3] > 100);
    }

    #[test]
    fn test_huge_radius_hits_device_limit() {
        let img = PixelBuffer::filled(1, 1, [255; 4]);
        for radius in [20_000.0, 3.0e9] {
            let params = DESCRIPTOR.schema.resolve(&serde_json::json!({ "radius": radius })).unwrap();
            let err = GaussianBlur.go_live_effect(&Executor::cpu(), &params, img.clone()).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::ResourceLimitExceeded);
        }
    }

    #[test]
    fn test_scale_radius() {
        let params = DESCRIPTOR.schema.defaults();
        let scaled = GaussianBlur.on_scale_params(&params, 3.0);
        assert_eq!(scaled.real("radius").unwrap(), 3.0);
    }
}
