//! Live effects for livefx.
//!
//! Each effect implements the [`LiveEffect`] callbacks (edit, interpolate,
//! scale, render UI, render pixels) and is registered under a stable id.
//! Hosts use the functions in [`host`], which resolve the id, validate the
//! parameter state against the effect's schema and dispatch.
//!
//! # Effects
//!
//! | id | kernel |
//! |----|--------|
//! | `blur-v1` | Gaussian blur (buffer kernel) |
//! | `directional-blur-v1` | directional blur (texture kernel) |
//! | `chromatic-aberration-v1` | RGB/CMYK channel offset (texture kernel) |
//! | `randomNoise-v1` | CPU noise, for pipeline smoke tests |

pub mod effects;
pub mod error;
pub mod host;
pub mod registry;
pub mod traits;
pub mod ui;

pub use effects::Effect;
pub use error::{EffectError, EffectResult, ErrorKind};
pub use host::{apply, describe_ui, edit, interpolate, scale};
pub use registry::{EffectSummary, list, resolve};
pub use traits::LiveEffect;
pub use ui::UiNode;
