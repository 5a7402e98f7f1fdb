//! CLI command implementations

pub mod apply;
pub mod describe;
pub mod list;
pub mod params;

use anyhow::{Context, Result};
use serde_json::Value;

/// Parses a parameter state argument: inline JSON, or `@path` to read a file.
///
/// A missing argument is an empty state.
pub fn parse_state(arg: Option<&str>) -> Result<Value> {
    let Some(arg) = arg else {
        return Ok(Value::Object(Default::default()));
    };
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read: {path}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid parameter JSON: {text}"))
}

/// Pretty-prints `value` to stdout.
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}
