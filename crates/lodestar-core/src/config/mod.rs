mod cache_config;
pub mod defaults;
mod expansion_config;
mod fusion_config;
mod intent_config;
mod merge_config;
mod observability_config;
mod retrieval_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use expansion_config::ExpansionConfig;
pub use fusion_config::FusionConfig;
pub use intent_config::IntentConfig;
pub use merge_config::MergeConfig;
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::RetrievalConfig;

use crate::errors::{ConfigError, LodestarResult};
use crate::intent::weights::parse_weight_overrides;

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LodestarConfig {
    pub retrieval: RetrievalConfig,
    pub fusion: FusionConfig,
    pub merge: MergeConfig,
    pub cache: CacheConfig,
    pub intent: IntentConfig,
    pub expansion: ExpansionConfig,
    pub observability: ObservabilityConfig,
}

impl LodestarConfig {
    /// Parse and validate a TOML document. Empty input yields all defaults.
    pub fn from_toml(input: &str) -> LodestarResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> LodestarResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &str, reason: &str) -> ConfigError {
            ConfigError::InvalidValue {
                field: field.to_string(),
                reason: reason.to_string(),
            }
        }

        if self.fusion.rrf_k == 0 {
            return Err(invalid("fusion.rrf_k", "must be positive"));
        }
        if self.retrieval.top_k == 0 {
            return Err(invalid("retrieval.top_k", "must be positive"));
        }
        if self.retrieval.retriever_timeout_ms == 0 {
            return Err(invalid("retrieval.retriever_timeout_ms", "must be positive"));
        }
        if self.retrieval.request_deadline_ms == 0 {
            return Err(invalid("retrieval.request_deadline_ms", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.merge.similarity_threshold) {
            return Err(invalid("merge.similarity_threshold", "must be within [0, 1]"));
        }
        if self.merge.max_merged_tokens == 0 {
            return Err(invalid("merge.max_merged_tokens", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.intent.confidence_floor) {
            return Err(invalid("intent.confidence_floor", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.expansion.min_confidence) {
            return Err(invalid("expansion.min_confidence", "must be within [0, 1]"));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs", "must be positive when the cache is enabled"));
        }
        parse_weight_overrides(&self.fusion.weights)?;
        Ok(())
    }
}
