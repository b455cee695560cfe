//! # lodestar-observability
//!
//! Structured tracing (subscriber setup, span macros, event functions),
//! retrieval metrics, degraded-signal tracking, and a bounded query log.

pub mod degradation;
pub mod engine;
pub mod metrics;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use engine::{ObservabilityEngine, ObservabilitySnapshot};
pub use metrics::RetrievalMetrics;
pub use query_log::{QueryLog, QueryLogEntry};
