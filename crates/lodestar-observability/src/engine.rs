//! [`ObservabilityEngine`]: owns metrics, degradation tracking, and the query log.

use lodestar_core::errors::LodestarResult;
use lodestar_core::intent::Intent;
use lodestar_core::models::{DegradationEvent, RetrieverTag};
use serde::Serialize;

use crate::degradation::DegradationTracker;
use crate::metrics::RetrievalMetrics;
use crate::query_log::{QueryLog, QueryLogEntry};
use crate::tracing_setup::events;

/// Point-in-time view for diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ObservabilitySnapshot {
    pub metrics: RetrievalMetrics,
    pub active_degradations: Vec<String>,
    pub query_count: usize,
    pub avg_latency_ms: u64,
    pub p95_latency_ms: u64,
}

#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    pub metrics: RetrievalMetrics,
    pub degradation: DegradationTracker,
    pub query_log: QueryLog,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_log_capacity(capacity: usize) -> Self {
        Self {
            query_log: QueryLog::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Component name used for a retriever in the degradation tracker.
    pub fn retriever_component(retriever: RetrieverTag) -> String {
        format!("retriever.{}", retriever.as_str())
    }

    /// Record that a retriever failed for one request.
    pub fn record_signal_degraded(&mut self, request_id: &str, retriever: RetrieverTag, failure: &str) {
        events::signal_degraded(request_id, retriever.as_str(), failure);
        self.metrics.record_degraded(retriever);
        self.degradation.record(
            DegradationEvent::new(
                Self::retriever_component(retriever),
                failure,
                "weight redistributed",
            )
            .for_request(request_id),
        );
    }

    /// Record that a retriever answered; clears any active degradation.
    pub fn record_signal_healthy(&mut self, retriever: RetrieverTag) {
        self.degradation
            .mark_recovered(&Self::retriever_component(retriever));
    }

    /// Record a component-level fallback (classifier, expansion, cache store).
    pub fn record_degradation(&mut self, event: DegradationEvent) {
        self.degradation.record(event);
    }

    pub fn record_completed(&mut self, entry: QueryLogEntry) {
        self.metrics
            .record_query(entry.intent, entry.result_count, entry.cache_hit);
        self.query_log.record(entry);
    }

    pub fn record_failed(&mut self, intent: Option<Intent>) {
        self.metrics.record_failure(intent);
    }

    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            metrics: self.metrics.clone(),
            active_degradations: self
                .degradation
                .active_degradations()
                .iter()
                .map(|t| t.event.component.clone())
                .collect(),
            query_count: self.query_log.count(),
            avg_latency_ms: self.query_log.avg_latency().as_millis() as u64,
            p95_latency_ms: self.query_log.latency_percentile(0.95).as_millis() as u64,
        }
    }

    /// Serialize the snapshot to JSON.
    pub fn snapshot_json(&self) -> LodestarResult<serde_json::Value> {
        Ok(serde_json::to_value(self.snapshot())?)
    }
}
