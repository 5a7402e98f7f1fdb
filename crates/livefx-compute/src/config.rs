//! Engine configuration.
//!
//! [`EngineConfig`] is built once (from defaults, the environment or an
//! [`EngineBuilder`]) and handed to [`Executor::new`](crate::Executor::new).
//!
//! Environment:
//! - `LIVEFX_BACKEND`: `auto`, `cpu` or `wgpu`
//! - `LIVEFX_DEBUG`: `1` enables diagnostics with per-dispatch timings

use tracing::warn;

use crate::backend::Backend;
use crate::executor::Executor;
use crate::ComputeResult;

/// GPU adapter power preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
}

/// Diagnostics switches injected into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    /// Emit debug events for engine decisions.
    pub enabled: bool,
    /// Emit a timing event per dispatch. Ignored unless `enabled`.
    pub timings: bool,
}

impl Diagnostics {
    /// Diagnostics with timings on.
    pub fn verbose() -> Self {
        Self { enabled: true, timings: true }
    }

    pub fn timings_enabled(&self) -> bool {
        self.enabled && self.timings
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub backend: Backend,
    pub power: PowerPreference,
    pub diagnostics: Diagnostics,
}

impl EngineConfig {
    /// Defaults overridden by `LIVEFX_BACKEND` and `LIVEFX_DEBUG`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("LIVEFX_BACKEND").ok().as_deref(),
            std::env::var("LIVEFX_DEBUG").ok().as_deref(),
        )
    }

    fn from_vars(backend: Option<&str>, debug: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(value) = backend {
            match Backend::parse(value) {
                Some(b) => config.backend = b,
                None => warn!(value, "ignoring unknown LIVEFX_BACKEND"),
            }
        }
        if let Some(value) = debug {
            if matches!(value.trim(), "1" | "true" | "yes" | "on") {
                config.diagnostics = Diagnostics::verbose();
            }
        }
        config
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}

/// Builder for an [`Executor`].
///
/// # Example
/// ```ignore
/// let engine = EngineBuilder::new()
///     .backend(Backend::Cpu)
///     .diagnostics(Diagnostics::verbose())
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing config.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Set compute backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn power(mut self, power: PowerPreference) -> Self {
        self.config.power = power;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.config.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the Executor.
    pub fn build(self) -> ComputeResult<Executor> {
        Executor::new(self.config)
    }
}
