//! Static effect registry.

use std::collections::HashMap;
use std::sync::LazyLock;

use livefx_core::Version;
use serde::Serialize;
use tracing::debug;

use crate::effects::Effect;

/// Registry entry as shown to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub version: Version,
}

static EFFECTS: LazyLock<Vec<Effect>> = LazyLock::new(|| Effect::all().to_vec());

static BY_ID: LazyLock<HashMap<&'static str, &'static Effect>> = LazyLock::new(|| {
    let map: HashMap<_, _> = EFFECTS.iter().map(|fx| (fx.id(), fx)).collect();
    debug!(count = map.len(), "effect registry initialized");
    map
});

/// All registered effects, in registration order.
pub fn list() -> Vec<EffectSummary> {
    EFFECTS
        .iter()
        .map(|fx| {
            let d = fx.live().descriptor();
            EffectSummary { id: d.id, title: d.title, version: d.version }
        })
        .collect()
}

/// Looks up an effect by id.
pub fn resolve(effect_id: &str) -> Option<&'static Effect> {
    BY_ID.get(effect_id).copied()
}
