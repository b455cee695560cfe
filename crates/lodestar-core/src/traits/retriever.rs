use async_trait::async_trait;

use crate::errors::LodestarResult;
use crate::intent::Intent;
use crate::models::{Candidate, ExpandedQuery, QueryFilters, RetrieverTag};

/// One independent retrieval signal (lexical, sparse, dense, or graph).
///
/// Implementations translate the shared query into their backend's query
/// language. The orchestrator bounds every call with its own timeout.
#[async_trait]
pub trait ISignalRetriever: Send + Sync {
    /// Which signal this retriever provides.
    fn tag(&self) -> RetrieverTag;

    /// Return up to `top_k` candidates, best first, with 1-based ranks.
    async fn retrieve(
        &self,
        query: &ExpandedQuery,
        intent: Intent,
        filters: &QueryFilters,
        top_k: usize,
    ) -> LodestarResult<Vec<Candidate>>;
}
