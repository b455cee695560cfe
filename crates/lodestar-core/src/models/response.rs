use serde::{Deserialize, Serialize};

use crate::intent::Intent;

use super::{ExpandedTerms, MergedResult, PipelineState, RetrieverTag};

/// How the request's intent was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    Override,
    Rule,
    Embedding,
    Fallback,
}

/// The single retrieval operation's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub request_id: String,
    pub intent: Intent,
    pub intent_confidence: f64,
    pub intent_source: IntentSource,
    pub results: Vec<MergedResult>,
    /// Retrievers that timed out or failed for this request. Empty on cache hits.
    pub degraded: Vec<RetrieverTag>,
    pub cache_hit: bool,
    /// Index generation the results were computed against.
    pub generation: u64,
    pub expanded_terms: ExpandedTerms,
    /// States visited, in order.
    pub trace: Vec<PipelineState>,
    pub elapsed_ms: u64,
}

impl RetrievalResponse {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
