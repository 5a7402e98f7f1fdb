//! Describe command
//!
//! Prints an effect's descriptor, resolved parameters and UI tree as JSON.

use anyhow::{Result, bail};
use livefx_core::ParamSpec;
use serde_json::{Value, json};
use tracing::trace;

use crate::DescribeArgs;

fn spec_json(name: &str, spec: &ParamSpec) -> Value {
    let mut v = json!({
        "name": name,
        "type": spec.kind_name(),
        "default": spec.default_value(),
    });
    if let ParamSpec::Enum { options, .. } = spec {
        v["enum"] = json!(options);
    }
    v
}

pub fn run(args: DescribeArgs, verbose: bool) -> Result<()> {
    trace!(effect = %args.effect, "describe::run");
    let Some(effect) = livefx_effects::resolve(&args.effect) else {
        bail!("unknown effect id '{}'", args.effect);
    };
    let state = super::parse_state(args.params.as_deref())?;
    let d = effect.live().descriptor();

    let params = d.schema.resolve(&state)?;
    let ui = livefx_effects::describe_ui(&args.effect, &state)?;
    let schema: Vec<Value> = d.schema.fields().iter().map(|(n, s)| spec_json(n, s)).collect();

    let mut out = json!({
        "id": d.id,
        "title": d.title,
        "version": d.version,
        "styleFilterFlags": d.style_filter_flags,
        "paramSchema": schema,
        "params": params,
        "ui": ui,
    });
    if verbose {
        out["spatialFields"] = json!(effect.live().spatial_fields());
    }
    super::print_json(&out)
}
