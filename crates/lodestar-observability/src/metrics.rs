//! Per-intent query counts, cache effectiveness, and per-retriever degradation counts.

use std::collections::BTreeMap;

use lodestar_core::intent::Intent;
use lodestar_core::models::RetrieverTag;
use serde::{Deserialize, Serialize};

/// Tracks retrieval effectiveness metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub queries_by_intent: BTreeMap<String, u64>,
    /// Queries that returned at least one result, per intent.
    pub hits_by_intent: BTreeMap<String, u64>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub degraded_by_retriever: BTreeMap<String, u64>,
    pub failed_requests: u64,
    /// Failed requests whose intent was resolved before failing.
    pub failures_by_intent: BTreeMap<String, u64>,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed request.
    pub fn record_query(&mut self, intent: Intent, result_count: usize, cache_hit: bool) {
        let key = intent.as_str().to_string();
        *self.queries_by_intent.entry(key.clone()).or_default() += 1;
        if result_count > 0 {
            *self.hits_by_intent.entry(key).or_default() += 1;
        }
        if cache_hit {
            self.cache_hits += 1;
        } else {
            self.cache_misses += 1;
        }
    }

    pub fn record_degraded(&mut self, retriever: RetrieverTag) {
        *self
            .degraded_by_retriever
            .entry(retriever.as_str().to_string())
            .or_default() += 1;
    }

    /// Record a failed request. `None` when it failed before classification.
    pub fn record_failure(&mut self, intent: Option<Intent>) {
        self.failed_requests += 1;
        if let Some(intent) = intent {
            *self
                .failures_by_intent
                .entry(intent.as_str().to_string())
                .or_default() += 1;
        }
    }

    /// Share of requests served from cache.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / total as f64
    }

    /// Share of queries for an intent that returned results.
    pub fn hit_rate(&self, intent: Intent) -> f64 {
        let queries = self.queries_by_intent.get(intent.as_str()).copied().unwrap_or(0);
        if queries == 0 {
            return 0.0;
        }
        let hits = self.hits_by_intent.get(intent.as_str()).copied().unwrap_or(0);
        hits as f64 / queries as f64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
