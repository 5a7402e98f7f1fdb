//! Host-facing entry points.
//!
//! Every call takes an effect id plus loosely typed JSON parameter state and
//! returns a typed result; nothing here panics on bad input.
//!
//! ```ignore
//! use livefx_compute::Executor;
//! use serde_json::json;
//!
//! let engine = Executor::cpu();
//! let out = livefx_effects::apply(&engine, "directional-blur-v1", &json!({"strength": 12}), w, h, pixels)?;
//! ```

use livefx_compute::Executor;
use livefx_core::{ParameterSet, PixelBuffer};
use serde_json::Value;
use tracing::{debug, trace};

use crate::effects::Effect;
use crate::error::{EffectError, EffectResult};
use crate::registry;
use crate::ui::UiNode;

fn lookup(effect_id: &str) -> EffectResult<&'static Effect> {
    registry::resolve(effect_id).ok_or_else(|| EffectError::UnknownEffectId(effect_id.to_string()))
}

fn resolve_state(effect: &Effect, state: &Value) -> EffectResult<ParameterSet> {
    Ok(effect.live().descriptor().schema.resolve(state)?)
}

/// Renders `effect_id` over a `width x height` RGBA8 image.
///
/// The pixel length is checked before anything reaches a device. The result
/// may be larger than the input when the effect spills past its bounds.
pub fn apply(
    engine: &Executor,
    effect_id: &str,
    state: &Value,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> EffectResult<PixelBuffer> {
    trace!(effect = effect_id, width, height, "host::apply");
    let effect = lookup(effect_id)?;
    let image = PixelBuffer::new(width, height, pixels)?;
    let params = resolve_state(effect, state)?;

    let out = effect.live().go_live_effect(engine, &params, image)?;
    debug!(effect = effect_id, out_w = out.width(), out_h = out.height(), "effect applied");
    Ok(out)
}

/// UI tree for `effect_id` bound to `state`, or `None` for unknown ids.
pub fn describe_ui(effect_id: &str, state: &Value) -> EffectResult<Option<UiNode>> {
    let Some(effect) = registry::resolve(effect_id) else {
        return Ok(None);
    };
    let params = resolve_state(effect, state)?;
    Ok(Some(effect.live().render_ui(&params)))
}

pub fn edit(effect_id: &str, state: &Value) -> EffectResult<ParameterSet> {
    let effect = lookup(effect_id)?;
    let params = resolve_state(effect, state)?;
    Ok(effect.live().on_edit_parameters(params))
}

pub fn interpolate(effect_id: &str, a: &Value, b: &Value, t: f64) -> EffectResult<ParameterSet> {
    let effect = lookup(effect_id)?;
    let a = resolve_state(effect, a)?;
    let b = resolve_state(effect, b)?;
    effect.live().on_interpolate(&a, &b, t)
}

pub fn scale(effect_id: &str, state: &Value, factor: f64) -> EffectResult<ParameterSet> {
    let effect = lookup(effect_id)?;
    let params = resolve_state(effect, state)?;
    Ok(effect.live().on_scale_params(&params, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_unknown_id() {
        let err = apply(&Executor::cpu(), "nope", &json!({}), 1, 1, vec![0; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEffectId);
        assert_eq!(describe_ui("nope", &json!({})).unwrap(), None);
        assert!(edit("nope", &json!({})).is_err());
    }

    #[test]
    fn test_size_checked_before_params() {
        let err = apply(&Executor::cpu(), "blur-v1", &json!({ "radius": "big" }), 2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferSizeMismatch);
    }

    #[test]
    fn test_schema_violation_names_field() {
        let err = apply(&Executor::cpu(), "blur-v1", &json!({ "radius": "big" }), 1, 1, vec![0; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.subject(), Some("radius"));
    }

    #[test]
    fn test_describe_ui_uses_state() {
        let node = describe_ui("chromatic-aberration-v1", &json!({ "strength": 42 })).unwrap().unwrap();
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["children"][1]["children"][0]["value"], json!(42.0));
    }
}
