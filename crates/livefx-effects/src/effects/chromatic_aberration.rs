//! Chromatic aberration (`chromatic-aberration-v1`).

use livefx_compute::kernels::{self, BLEND_MODES, COLOR_MODES};
use livefx_compute::{Executor, Invocation};
use livefx_core::geometry::pad;
use livefx_core::{
    EffectDescriptor, ParamSchema, ParamSpec, ParameterSet, PixelBuffer, StyleFeature, StyleFilterFlag,
    StyleFilterFlags, Version,
};
use tracing::{debug, trace};

use crate::error::EffectResult;
use crate::traits::LiveEffect;
use crate::ui::{self, DataType, UiNode};

pub const ID: &str = "chromatic-aberration-v1";

static DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    id: ID,
    title: "Chromatic Aberration V1",
    version: Version { major: 1, minor: 0 },
    style_filter_flags: StyleFilterFlags {
        main: StyleFilterFlag::PostEffectFilter,
        features: &[StyleFeature::ScaleParams],
    },
    schema: ParamSchema::new(&[
        ("colorMode", ParamSpec::Enum { options: COLOR_MODES, default: "rgb" }),
        ("strength", ParamSpec::Real { default: 1.0 }),
        ("angle", ParamSpec::Real { default: 0.0 }),
        ("opacity", ParamSpec::Real { default: 100.0 }),
        ("blendMode", ParamSpec::Enum { options: BLEND_MODES, default: "under" }),
        ("padding", ParamSpec::Int { default: 0 }),
    ]),
};

/// Channel-offset sampling in RGB or CMYK.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromaticAberration;

impl LiveEffect for ChromaticAberration {
    fn descriptor(&self) -> &'static EffectDescriptor {
        &DESCRIPTOR
    }

    fn spatial_fields(&self) -> &'static [&'static str] {
        &["strength", "padding"]
    }

    fn render_ui(&self, params: &ParameterSet) -> UiNode {
        let real = |key: &str| params.real(key).unwrap_or_default();
        ui::col(vec![
            ui::row(vec![ui::select(
                "colorMode",
                "Color Mode",
                params.string("colorMode").unwrap_or("rgb"),
                COLOR_MODES,
            )]),
            ui::row(vec![ui::slider("strength", "Strength", DataType::Float, (0.0, 200.0), real("strength"))]),
            ui::row(vec![ui::slider("angle", "Angle", DataType::Float, (0.0, 360.0), real("angle"))]),
            ui::row(vec![ui::slider("opacity", "Opacity", DataType::Float, (0.0, 100.0), real("opacity"))]),
            ui::row(vec![ui::select(
                "blendMode",
                "Blend Mode",
                params.string("blendMode").unwrap_or("under"),
                BLEND_MODES,
            )]),
            ui::separator(),
            ui::col(vec![
                ui::text("Debugging parameters"),
                ui::slider("padding", "Padding", DataType::Int, (0.0, 200.0), real("padding")),
            ]),
        ])
    }

    fn go_live_effect(&self, engine: &Executor, params: &ParameterSet, image: PixelBuffer) -> EffectResult<PixelBuffer> {
        let strength = params.real("strength")?;
        let padding = params.int("padding")?.clamp(0, u32::MAX as i64) as u32;
        trace!(strength, padding, w = image.width(), h = image.height(), "ChromaticAberration::go_live_effect");

        if strength == 0.0 {
            debug!("zero strength, returning padded original");
            engine.check_canvas(ID, &kernels::CHROMATIC_ABERRATION, image.width(), image.height(), padding)?;
            return Ok(pad(&image, padding)?);
        }

        let inv = Invocation::new(&kernels::CHROMATIC_ABERRATION, params, padding);
        Ok(engine.run(ID, &inv, &image)?)
    }
}
