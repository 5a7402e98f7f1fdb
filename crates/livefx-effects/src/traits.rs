//! The live effect contract.

use livefx_compute::Executor;
use livefx_core::{EffectDescriptor, ParamValue, ParameterSet, PixelBuffer};

use crate::error::EffectResult;
use crate::ui::UiNode;

/// Callbacks every registered effect provides.
///
/// Parameter sets passed in are already resolved against the effect's
/// schema: every declared key is present with a value of its declared kind.
pub trait LiveEffect: Send + Sync {
    fn descriptor(&self) -> &'static EffectDescriptor;

    /// Fields multiplied by [`on_scale_params`](Self::on_scale_params).
    fn spatial_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Normalizes an edited parameter set. Identity by default.
    fn on_edit_parameters(&self, params: ParameterSet) -> ParameterSet {
        params
    }

    /// Lerps numeric fields; other fields take `b`'s value.
    fn on_interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> EffectResult<ParameterSet> {
        Ok(self.descriptor().schema.interpolate(a, b, t)?)
    }

    /// Multiplies the spatial fields by `scale`, rounding ints.
    fn on_scale_params(&self, params: &ParameterSet, scale: f64) -> ParameterSet {
        let spatial = self.spatial_fields();
        params
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    _ if !spatial.contains(&name) => value.clone(),
                    ParamValue::Real(v) => ParamValue::Real(v * scale),
                    ParamValue::Int(v) => ParamValue::Int((*v as f64 * scale).round() as i64),
                    other => other.clone(),
                };
                (name.to_string(), value)
            })
            .collect()
    }

    fn render_ui(&self, params: &ParameterSet) -> UiNode;

    /// Renders the effect over `image`.
    fn go_live_effect(&self, engine: &Executor, params: &ParameterSet, image: PixelBuffer) -> EffectResult<PixelBuffer>;
}
