//! Random noise (`randomNoise-v1`).
//!
//! A CPU-only smoke-test effect: every pixel gets uniform random RGB, and
//! only the first [`OPAQUE_PIXELS`] pixels are opaque.

use livefx_compute::Executor;
use livefx_core::{EffectDescriptor, ParamSchema, ParameterSet, PixelBuffer, StyleFilterFlag, StyleFilterFlags, Version};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::error::EffectResult;
use crate::traits::LiveEffect;
use crate::ui::{self, UiNode};

pub const ID: &str = "randomNoise-v1";

/// Pixels with index `<= OPAQUE_PIXELS` get alpha 255, the rest 0.
pub const OPAQUE_PIXELS: usize = 500;

static DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    id: ID,
    title: "Random Noise V1",
    version: Version { major: 1, minor: 0 },
    style_filter_flags: StyleFilterFlags {
        main: StyleFilterFlag::PostEffectFilter,
        features: &[],
    },
    schema: ParamSchema::empty(),
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNoise {
    seed: Option<u64>,
}

impl RandomNoise {
    /// Noise with a fixed seed; each call produces the same image.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl LiveEffect for RandomNoise {
    fn descriptor(&self) -> &'static EffectDescriptor {
        &DESCRIPTOR
    }

    fn on_edit_parameters(&self, _params: ParameterSet) -> ParameterSet {
        ParameterSet::new()
    }

    fn render_ui(&self, _params: &ParameterSet) -> UiNode {
        ui::group(ui::Direction::Col, Vec::new())
    }

    fn go_live_effect(&self, _engine: &Executor, _params: &ParameterSet, mut image: PixelBuffer) -> EffectResult<PixelBuffer> {
        trace!(w = image.width(), h = image.height(), "RandomNoise::go_live_effect");
        let mut rng = self.rng();
        for (i, px) in image.data_mut().chunks_exact_mut(4).enumerate() {
            px[0] = rng.gen_range(0..=u8::MAX);
            px[1] = rng.gen_range(0..=u8::MAX);
            px[2] = rng.gen_range(0..=u8::MAX);
            px[3] = if i <= OPAQUE_PIXELS { 255 } else { 0 };
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_cutoff() {
        let img = PixelBuffer::filled(30, 30, [255; 4]);
        let out = RandomNoise::with_seed(7)
            .go_live_effect(&Executor::cpu(), &ParameterSet::new(), img)
            .unwrap();
        let alpha: Vec<u8> = out.data().chunks_exact(4).map(|p| p[3]).collect();
        assert!(alpha[..=OPAQUE_PIXELS].iter().all(|a| *a == 255));
        assert!(alpha[OPAQUE_PIXELS + 1..].iter().all(|a| *a == 0));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let img = PixelBuffer::filled(8, 8, [0; 4]);
        let fx = RandomNoise::with_seed(42);
        let a = fx.go_live_effect(&Executor::cpu(), &ParameterSet::new(), img.clone()).unwrap();
        let b = fx.go_live_effect(&Executor::cpu(), &ParameterSet::new(), img.clone()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, img);
    }

    #[test]
    fn test_edit_clears_params() {
        let mut params = ParameterSet::new();
        params.insert("junk", livefx_core::ParamValue::Bool(true));
        assert!(RandomNoise::default().on_edit_parameters(params).is_empty());
    }
}
