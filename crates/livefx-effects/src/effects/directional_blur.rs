//! Directional blur (`directional-blur-v1`).

use livefx_compute::kernels::{self, BLUR_MODES};
use livefx_compute::{Executor, Invocation};
use livefx_core::{
    EffectDescriptor, ParamSchema, ParamSpec, ParameterSet, PixelBuffer, StyleFeature, StyleFilterFlag,
    StyleFilterFlags, Version,
};
use tracing::trace;

use crate::error::EffectResult;
use crate::traits::LiveEffect;
use crate::ui::{self, DataType, UiNode};

pub const ID: &str = "directional-blur-v1";

static DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    id: ID,
    title: "Directional Blur V1",
    version: Version { major: 1, minor: 0 },
    style_filter_flags: StyleFilterFlags {
        main: StyleFilterFlag::PostEffectFilter,
        features: &[StyleFeature::ScaleParams],
    },
    schema: ParamSchema::new(&[
        ("strength", ParamSpec::Real { default: 5.0 }),
        ("angle", ParamSpec::Real { default: 0.0 }),
        ("opacity", ParamSpec::Real { default: 100.0 }),
        ("blurMode", ParamSpec::Enum { options: BLUR_MODES, default: "both" }),
        ("fadeOut", ParamSpec::Real { default: 0.0 }),
        ("fadeDirection", ParamSpec::Real { default: 0.0 }),
    ]),
};

/// Motion-style blur along one direction, optionally one-sided and fading
/// toward the image center.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalBlur;

/// Overflow margin for a blur strength, saturating at `u32::MAX`.
fn margin(strength: f64) -> u32 {
    strength.ceil().clamp(0.0, u32::MAX as f64) as u32
}

impl LiveEffect for DirectionalBlur {
    fn descriptor(&self) -> &'static EffectDescriptor {
        &DESCRIPTOR
    }

    fn spatial_fields(&self) -> &'static [&'static str] {
        &["strength"]
    }

    fn render_ui(&self, params: &ParameterSet) -> UiNode {
        let real = |key: &str| params.real(key).unwrap_or_default();
        let labeled = |label: &str, control: UiNode| ui::col(vec![ui::text(label), control]);
        ui::col(vec![
            labeled("Size (px)", ui::slider("strength", "Size (px)", DataType::Float, (0.0, 500.0), real("strength"))),
            labeled("Direction", ui::slider("angle", "Direction", DataType::Float, (0.0, 360.0), real("angle"))),
            labeled("Opacity", ui::slider("opacity", "Opacity", DataType::Float, (0.0, 100.0), real("opacity"))),
            labeled(
                "Blur Mode",
                ui::select_labeled(
                    "blurMode",
                    "Blur Mode",
                    params.string("blurMode").unwrap_or("both"),
                    &[("both", "Both"), ("behind", "Behind"), ("front", "Front")],
                ),
            ),
            labeled("Scale to fade", ui::slider("fadeOut", "Scale to fade", DataType::Float, (0.0, 1.0), real("fadeOut"))),
            labeled(
                "Direction to fade",
                ui::slider("fadeDirection", "Direction to fade", DataType::Float, (-1.0, 1.0), real("fadeDirection")),
            ),
        ])
    }

    fn go_live_effect(&self, engine: &Executor, params: &ParameterSet, image: PixelBuffer) -> EffectResult<PixelBuffer> {
        let strength = params.real("strength")?;
        let opacity = params.real("opacity")?;
        trace!(strength, opacity, w = image.width(), h = image.height(), "DirectionalBlur::go_live_effect");
        if strength <= 0.0 || opacity <= 0.0 {
            return Ok(image);
        }

        let inv = Invocation::new(&kernels::DIRECTIONAL_BLUR, params, margin(strength));
        Ok(engine.run(ID, &inv, &image)?)
    }
}
