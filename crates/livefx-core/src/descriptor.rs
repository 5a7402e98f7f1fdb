//! Static effect metadata.

use serde::Serialize;

use crate::params::ParamSchema;

/// Effect version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Stage a host runs the effect in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleFilterFlag {
    PostEffectFilter,
}

/// Optional host capabilities an effect opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleFeature {
    /// Parameters can be scaled with the artwork.
    ScaleParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleFilterFlags {
    pub main: StyleFilterFlag,
    pub features: &'static [StyleFeature],
}

/// Immutable description of a registered effect.
#[derive(Debug, Clone, Copy)]
pub struct EffectDescriptor {
    /// Unique id, e.g. `"directional-blur-v1"`.
    pub id: &'static str,
    pub title: &'static str,
    pub version: Version,
    pub style_filter_flags: StyleFilterFlags,
    pub schema: ParamSchema,
}

impl EffectDescriptor {
    /// True if the host may scale this effect's parameters.
    pub fn scales_with_artwork(&self) -> bool {
        self.style_filter_flags
            .features
            .contains(&StyleFeature::ScaleParams)
    }
}
