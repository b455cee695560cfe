use serde::{Deserialize, Serialize};

use super::defaults;

/// Orchestration and fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from each retriever.
    pub top_k: usize,
    /// Merged results returned when the request sets no limit.
    pub max_results: usize,
    /// Per-retriever call deadline.
    pub retriever_timeout_ms: u64,
    /// End-to-end deadline for the fan-out; answered signals are fused when it fires.
    pub request_deadline_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            max_results: defaults::DEFAULT_MAX_RESULTS,
            retriever_timeout_ms: defaults::DEFAULT_RETRIEVER_TIMEOUT_MS,
            request_deadline_ms: defaults::DEFAULT_REQUEST_DEADLINE_MS,
        }
    }
}
