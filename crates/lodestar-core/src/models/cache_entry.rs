use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::Intent;

use super::{MergedResult, RetrieverTag};

/// A memoized pipeline result. Owned by the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub intent: Intent,
    pub results: Vec<MergedResult>,
    pub created_at: DateTime<Utc>,
    /// Index generation the entry was computed against.
    pub generation: u64,
    /// Retrievers that failed or timed out while computing the entry.
    /// Empty unless degraded results are cached.
    #[serde(default)]
    pub degraded: Vec<RetrieverTag>,
}

impl CacheEntry {
    pub fn new(fingerprint: impl Into<String>, intent: Intent, results: Vec<MergedResult>, generation: u64) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            intent,
            results,
            created_at: Utc::now(),
            generation,
            degraded: Vec::new(),
        }
    }

    pub fn with_degraded(mut self, degraded: Vec<RetrieverTag>) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// Whether the entry outlived `ttl` as of `now`.
    pub fn is_expired(&self, ttl: std::time::Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.created_at >= ttl,
            Err(_) => false,
        }
    }
}
