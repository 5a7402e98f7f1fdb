//! Core types shared by the livefx crates.
//!
//! # Modules
//!
//! - [`pixel`] - RGBA8 [`PixelBuffer`] with a checked length invariant
//! - [`geometry`] - overflow padding, dispatch alignment and their inverses
//! - [`params`] - parameter schemas, resolution and interpolation
//! - [`descriptor`] - static effect metadata
//! - [`error`] - the [`Error`] type
//!
//! Nothing in this crate touches a GPU; everything here is pure and
//! unit-tested in isolation.

pub mod descriptor;
pub mod error;
pub mod geometry;
pub mod params;
pub mod pixel;

pub use descriptor::{EffectDescriptor, StyleFeature, StyleFilterFlag, StyleFilterFlags, Version};
pub use error::{Error, Result};
pub use geometry::AlignmentPlan;
pub use params::{ParamSchema, ParamSpec, ParamValue, ParameterSet};
pub use pixel::PixelBuffer;
