//! Per-effect compute context cache.
//!
//! Each effect id owns one slot. A slot is built lazily on first use and then
//! reused; its mutex is held for the whole invocation, so concurrent calls for
//! the same id run one after another while different ids never wait on each
//! other beyond the map lookup.
//!
//! Slot states:
//! - `Empty`: nothing built yet, or invalidated
//! - `Ready`: a usable context
//! - `Failed`: the last build failed; later calls fail fast with the same
//!   reason until [`PipelineCache::invalidate`] clears it
//!
//! A context that reports itself lost is dropped and rebuilt on the next
//! acquire. A half-built context is never stored.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::{ComputeError, ComputeResult};

/// A cached context that can detect device loss.
pub trait CachedContext: Send + Sync {
    fn is_lost(&self) -> bool;
}

enum SlotState<C> {
    Empty,
    Ready(Arc<C>),
    Failed(String),
}

/// Observable state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Ready,
    Failed,
}

type Slot<C> = Arc<Mutex<SlotState<C>>>;

pub struct PipelineCache<C> {
    slots: Mutex<HashMap<String, Slot<C>>>,
}

impl<C> Default for PipelineCache<C> {
    fn default() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|err| err.into_inner())
}

impl<C: CachedContext> PipelineCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, effect_id: &str) -> Slot<C> {
        let mut slots = lock(&self.slots);
        slots
            .entry(effect_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlotState::Empty)))
            .clone()
    }

    /// Returns the slot's context, building it if needed. Caller holds the slot lock.
    fn ensure<F>(state: &mut SlotState<C>, effect_id: &str, build: F) -> ComputeResult<Arc<C>>
    where
        F: FnOnce() -> ComputeResult<C>,
    {
        if let SlotState::Ready(ctx) = state {
            if !ctx.is_lost() {
                return Ok(ctx.clone());
            }
            warn!(effect = effect_id, "compute context lost, rebuilding");
            *state = SlotState::Empty;
        }
        if let SlotState::Failed(reason) = state {
            return Err(ComputeError::PipelineBuildFailed {
                effect: effect_id.to_string(),
                reason: reason.clone(),
            });
        }

        debug!(effect = effect_id, "building compute context");
        match build() {
            Ok(ctx) => {
                let ctx = Arc::new(ctx);
                *state = SlotState::Ready(ctx.clone());
                Ok(ctx)
            }
            Err(ComputeError::PipelineBuildFailed { effect, reason }) => {
                *state = SlotState::Failed(reason.clone());
                Err(ComputeError::PipelineBuildFailed { effect, reason })
            }
            Err(other) => Err(other),
        }
    }

    /// Returns the cached context for `effect_id`, building it on first use.
    pub fn acquire<F>(&self, effect_id: &str, build: F) -> ComputeResult<Arc<C>>
    where
        F: FnOnce() -> ComputeResult<C>,
    {
        let slot = self.slot(effect_id);
        let mut state = lock(&slot);
        Self::ensure(&mut state, effect_id, build)
    }

    /// Acquires the context and runs `work` while holding the slot.
    ///
    /// A [`ComputeError::DeviceLost`] from `work` empties the slot.
    pub fn with_context<T, B, W>(&self, effect_id: &str, build: B, work: W) -> ComputeResult<T>
    where
        B: FnOnce() -> ComputeResult<C>,
        W: FnOnce(&C) -> ComputeResult<T>,
    {
        let slot = self.slot(effect_id);
        let mut state = lock(&slot);
        let ctx = Self::ensure(&mut state, effect_id, build)?;
        let result = work(ctx.as_ref());
        if matches!(result, Err(ComputeError::DeviceLost { .. })) || ctx.is_lost() {
            warn!(effect = effect_id, "dropping lost compute context");
            *state = SlotState::Empty;
        }
        result
    }

    /// The ready, not-lost context for `effect_id`, without building one.
    pub fn peek(&self, effect_id: &str) -> Option<Arc<C>> {
        let slot = lock(&self.slots).get(effect_id).cloned()?;
        let state = lock(&slot);
        match &*state {
            SlotState::Ready(ctx) if !ctx.is_lost() => Some(ctx.clone()),
            _ => None,
        }
    }

    /// Clears the slot so the next acquire starts from scratch.
    pub fn invalidate(&self, effect_id: &str) {
        let slot = lock(&self.slots).get(effect_id).cloned();
        if let Some(slot) = slot {
            *lock(&slot) = SlotState::Empty;
            debug!(effect = effect_id, "compute context invalidated");
        }
    }

    pub fn status(&self, effect_id: &str) -> SlotStatus {
        let Some(slot) = lock(&self.slots).get(effect_id).cloned() else {
            return SlotStatus::Empty;
        };
        let state = lock(&slot);
        match &*state {
            SlotState::Empty => SlotStatus::Empty,
            SlotState::Ready(_) => SlotStatus::Ready,
            SlotState::Failed(_) => SlotStatus::Failed,
        }
    }
}
