use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Rank fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// RRF smoothing constant.
    pub rrf_k: u32,
    /// Per-intent weight overrides: intent name → retriever name → weight.
    /// Missing entries keep their defaults; each profile is renormalized.
    pub weights: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            weights: BTreeMap::new(),
        }
    }
}
