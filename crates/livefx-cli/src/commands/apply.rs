//! Apply command
//!
//! Loads a PNG, runs one effect and writes the (possibly larger) result.
//! A device loss is retried once on a fresh context.

use anyhow::{Context, Result};
use livefx_compute::{Diagnostics, EngineBuilder, EngineConfig, Executor};
use livefx_core::PixelBuffer;
use serde_json::Value;
use tracing::{info, trace, warn};

use crate::ApplyArgs;

fn apply_once(engine: &Executor, effect: &str, state: &Value, image: &PixelBuffer) -> livefx_effects::EffectResult<PixelBuffer> {
    livefx_effects::apply(engine, effect, state, image.width(), image.height(), image.data().to_vec())
}

pub fn run(args: ApplyArgs, verbose: bool) -> Result<()> {
    trace!(effect = %args.effect, input = %args.input.display(), "apply::run");
    let state = super::parse_state(args.params.as_deref())?;
    let image = crate::io::read_png(&args.input)?;

    let mut builder = EngineBuilder::from_config(EngineConfig::from_env()).power(args.power());
    if let Some(backend) = args.backend {
        builder = builder.backend(backend);
    }
    if verbose {
        builder = builder.diagnostics(Diagnostics::verbose());
    }
    let engine = builder.build().context("Failed to create compute engine")?;
    info!(effect = %args.effect, backend = engine.backend_name(), w = image.width(), h = image.height(), "Applying effect");

    let out = match apply_once(&engine, &args.effect, &state, &image) {
        Err(e) if e.is_retryable() => {
            warn!(effect = %args.effect, error = %e, "retrying once");
            engine.invalidate(&args.effect);
            apply_once(&engine, &args.effect, &state, &image)
        }
        other => other,
    }
    .with_context(|| format!("Failed to apply '{}'", args.effect))?;

    crate::io::write_png(&args.output, &out)?;
    if verbose {
        println!(
            "{}: {}x{} -> {}x{} ({})",
            args.effect,
            image.width(),
            image.height(),
            out.width(),
            out.height(),
            args.output.display()
        );
    }
    Ok(())
}
