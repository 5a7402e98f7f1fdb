//! The registered effects.

pub mod chromatic_aberration;
pub mod directional_blur;
pub mod gaussian_blur;
pub mod random_noise;

pub use chromatic_aberration::ChromaticAberration;
pub use directional_blur::DirectionalBlur;
pub use gaussian_blur::GaussianBlur;
pub use random_noise::RandomNoise;

use crate::traits::LiveEffect;

/// Closed set of effects, one variant per id.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    GaussianBlur(GaussianBlur),
    DirectionalBlur(DirectionalBlur),
    ChromaticAberration(ChromaticAberration),
    RandomNoise(RandomNoise),
}

impl Effect {
    /// Every effect, in registration order.
    pub fn all() -> [Effect; 4] {
        [
            Self::GaussianBlur(GaussianBlur),
            Self::DirectionalBlur(DirectionalBlur),
            Self::ChromaticAberration(ChromaticAberration),
            Self::RandomNoise(RandomNoise::default()),
        ]
    }

    pub fn id(&self) -> &'static str {
        self.live().descriptor().id
    }

    /// The effect's callbacks.
    pub fn live(&self) -> &dyn LiveEffect {
        match self {
            Self::GaussianBlur(fx) => fx,
            Self::DirectionalBlur(fx) => fx,
            Self::ChromaticAberration(fx) => fx,
            Self::RandomNoise(fx) => fx,
        }
    }
}
