use serde::{Deserialize, Serialize};

use super::defaults;

/// Logging and diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json_logs: bool,
    pub query_log_capacity: usize,
    pub token_cache_capacity: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: defaults::DEFAULT_JSON_LOGS,
            query_log_capacity: defaults::DEFAULT_QUERY_LOG_CAPACITY,
            token_cache_capacity: defaults::DEFAULT_TOKEN_CACHE_CAPACITY,
        }
    }
}
