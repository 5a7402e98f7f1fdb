//! Logging setup.
//!
//! Filter precedence: `LIVEFX_LOG`, then `RUST_LOG`, then the configured
//! default level. Logs go to stderr so JSON output on stdout stays clean.

use anyhow::{Result, anyhow};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level filter (default: "warn")
    pub default_level: String,
    /// Include module targets in log lines
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "warn".to_string(),
            with_target: false,
        }
    }
}

impl LogConfig {
    /// `debug` for the livefx crates when verbose, `warn` otherwise.
    pub fn for_verbosity(verbose: bool) -> Self {
        if verbose {
            Self {
                default_level: "warn,livefx_core=debug,livefx_compute=debug,livefx_effects=debug,livefx=debug"
                    .to_string(),
                with_target: true,
            }
        } else {
            Self::default()
        }
    }
}

pub fn init(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("LIVEFX_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
