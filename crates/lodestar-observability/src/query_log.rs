//! Query performance logging: request, intent, latency, result count, cache hit, degraded signals.

use std::collections::VecDeque;
use std::time::Duration;

use lodestar_core::intent::Intent;
use serde::{Deserialize, Serialize};

/// A single query log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub request_id: String,
    pub intent: Intent,
    pub latency: Duration,
    pub result_count: usize,
    pub cache_hit: bool,
    pub degraded_signals: usize,
    pub timestamp_epoch_ms: i64,
}

impl QueryLogEntry {
    /// Create a new entry with the timestamp set to now.
    pub fn new(
        request_id: impl Into<String>,
        intent: Intent,
        latency: Duration,
        result_count: usize,
        cache_hit: bool,
        degraded_signals: usize,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            intent,
            latency,
            result_count,
            cache_hit,
            degraded_signals,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Append-only query log with ring-buffer retention.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(10_000)
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a query.
    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            request_id = %entry.request_id,
            intent = %entry.intent,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            cache_hit = entry.cache_hit,
            degraded_signals = entry.degraded_signals,
            "query logged"
        );

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueryLogEntry> {
        self.entries.iter()
    }

    /// Average latency across all logged queries.
    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at the given percentile (0.0–1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let idx = ((p.clamp(0.0, 1.0) * (latencies.len() - 1) as f64).round() as usize)
            .min(latencies.len() - 1);
        latencies[idx]
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
