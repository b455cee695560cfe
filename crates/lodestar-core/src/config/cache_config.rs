use serde::{Deserialize, Serialize};

use super::defaults;

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: u64,
    /// Cache results computed while a retriever was degraded.
    pub cache_degraded: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_CACHE_ENABLED,
            ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES,
            cache_degraded: defaults::DEFAULT_CACHE_DEGRADED,
        }
    }
}
