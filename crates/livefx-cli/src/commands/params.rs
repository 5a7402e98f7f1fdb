//! Parameter commands: edit, interpolate, scale
//!
//! Each prints the resulting parameter set as a JSON object.

use anyhow::Result;
use tracing::trace;

use crate::{EditArgs, InterpolateArgs, ScaleArgs};

pub fn run_edit(args: EditArgs) -> Result<()> {
    trace!(effect = %args.effect, "params::run_edit");
    let state = super::parse_state(args.params.as_deref())?;
    let out = livefx_effects::edit(&args.effect, &state)?;
    super::print_json(&out)
}

pub fn run_interpolate(args: InterpolateArgs) -> Result<()> {
    trace!(effect = %args.effect, t = args.t, "params::run_interpolate");
    let from = super::parse_state(Some(&args.from))?;
    let to = super::parse_state(Some(&args.to))?;
    let out = livefx_effects::interpolate(&args.effect, &from, &to, args.t)?;
    super::print_json(&out)
}

pub fn run_scale(args: ScaleArgs) -> Result<()> {
    trace!(effect = %args.effect, factor = args.factor, "params::run_scale");
    let state = super::parse_state(args.params.as_deref())?;
    let out = livefx_effects::scale(&args.effect, &state, args.factor)?;
    super::print_json(&out)
}
