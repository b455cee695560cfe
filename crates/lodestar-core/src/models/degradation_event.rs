use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A degradation event when a component falls back to a lower-quality mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    /// e.g. `retriever.dense`, `intent.embedder`, `expansion`, `cache.store`.
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            request_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
