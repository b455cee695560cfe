use serde::{Deserialize, Serialize};

use super::defaults;

/// Neighbor merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Minimum neighbor similarity for absorption.
    pub similarity_threshold: f64,
    /// Token ceiling for a merged result's text.
    pub max_merged_tokens: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            max_merged_tokens: defaults::DEFAULT_MAX_MERGED_TOKENS,
        }
    }
}
