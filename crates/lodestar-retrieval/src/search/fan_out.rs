//! Concurrent signal fan-out.
//!
//! One task per retriever in a `JoinSet`, each bounded by its own timeout;
//! the whole set is bounded by the caller's absolute request deadline, so
//! time already spent on classification and expansion counts against it.
//! Dropping the fan-out future aborts every outstanding call.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use lodestar_core::errors::RetrievalError;
use lodestar_core::intent::Intent;
use lodestar_core::models::{Candidate, ExpandedQuery, QueryFilters, RetrieverTag};
use lodestar_core::traits::ISignalRetriever;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What one retriever produced for one request.
#[derive(Debug, Clone)]
pub struct SignalOutcome {
    pub retriever: RetrieverTag,
    pub candidates: Vec<Candidate>,
    /// Set when the retriever failed or timed out; `candidates` is then empty.
    pub failure: Option<RetrievalError>,
}

impl SignalOutcome {
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Outcomes for every registered retriever, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FanOutResult {
    pub outcomes: Vec<SignalOutcome>,
    /// Whether the request deadline cut the fan-out short.
    pub deadline_hit: bool,
}

impl FanOutResult {
    /// Retrievers that failed or timed out.
    pub fn degraded(&self) -> Vec<RetrieverTag> {
        let mut tags: Vec<RetrieverTag> = self
            .outcomes
            .iter()
            .filter(|o| o.is_degraded())
            .map(|o| o.retriever)
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(SignalOutcome::is_degraded)
    }

    /// Per-retriever lists for fusion. Degraded retrievers contribute empty lists.
    pub fn lists(&self) -> Vec<(RetrieverTag, Vec<Candidate>)> {
        self.outcomes
            .iter()
            .map(|o| (o.retriever, o.candidates.clone()))
            .collect()
    }

    /// `retriever: reason` for every failure, for error messages.
    pub fn failure_details(&self) -> String {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure.as_ref().map(|f| format!("{}: {f}", o.retriever)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct SignalFanOut {
    retrievers: Vec<Arc<dyn ISignalRetriever>>,
    retriever_timeout: Duration,
}

impl SignalFanOut {
    pub fn new(retrievers: Vec<Arc<dyn ISignalRetriever>>, retriever_timeout: Duration) -> Self {
        Self {
            retrievers,
            retriever_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.retrievers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retrievers.is_empty()
    }

    /// Call every retriever concurrently and collect what answered before
    /// `deadline`.
    pub async fn run(
        &self,
        query: Arc<ExpandedQuery>,
        intent: Intent,
        filters: Arc<QueryFilters>,
        top_k: usize,
        deadline: Instant,
    ) -> FanOutResult {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout_ms = self.retriever_timeout.as_millis() as u64;
        let tags: Vec<RetrieverTag> = self.retrievers.iter().map(|r| r.tag()).collect();
        let mut slots: Vec<Option<SignalOutcome>> = vec![None; self.retrievers.len()];

        let mut set = JoinSet::new();
        for (index, retriever) in self.retrievers.iter().enumerate() {
            let retriever = Arc::clone(retriever);
            let query = Arc::clone(&query);
            let filters = Arc::clone(&filters);
            let timeout = self.retriever_timeout;
            let tag = tags[index];

            set.spawn(async move {
                let call = AssertUnwindSafe(retriever.retrieve(&query, intent, &filters, top_k))
                    .catch_unwind();
                let outcome = match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(Ok(mut candidates))) => {
                        candidates.truncate(top_k);
                        SignalOutcome {
                            retriever: tag,
                            candidates,
                            failure: None,
                        }
                    }
                    Ok(Ok(Err(e))) => failed(tag, RetrievalError::SignalFailed {
                        retriever: tag.to_string(),
                        reason: e.to_string(),
                    }),
                    Ok(Err(_)) => failed(tag, RetrievalError::SignalFailed {
                        retriever: tag.to_string(),
                        reason: "retriever panicked".to_string(),
                    }),
                    Err(_) => failed(tag, RetrievalError::SignalTimeout {
                        retriever: tag.to_string(),
                        timeout_ms,
                    }),
                };
                (index, outcome)
            });
        }

        let mut deadline_hit = false;
        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((index, outcome)))) => {
                    debug!(
                        retriever = %outcome.retriever,
                        candidates = outcome.candidates.len(),
                        degraded = outcome.is_degraded(),
                        "signal answered"
                    );
                    slots[index] = Some(outcome);
                }
                Ok(Some(Err(e))) => warn!(error = %e, "signal task ended abnormally"),
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    set.abort_all();
                    break;
                }
            }
        }

        let deadline_ms = remaining.as_millis() as u64;
        let outcomes = slots
            .into_iter()
            .zip(tags)
            .map(|(slot, tag)| {
                slot.unwrap_or_else(|| {
                    let failure = if deadline_hit {
                        RetrievalError::SignalTimeout {
                            retriever: tag.to_string(),
                            timeout_ms: deadline_ms,
                        }
                    } else {
                        RetrievalError::SignalFailed {
                            retriever: tag.to_string(),
                            reason: "task aborted".to_string(),
                        }
                    };
                    failed(tag, failure)
                })
            })
            .collect();

        FanOutResult {
            outcomes,
            deadline_hit,
        }
    }
}

fn failed(retriever: RetrieverTag, failure: RetrievalError) -> SignalOutcome {
    SignalOutcome {
        retriever,
        candidates: Vec::new(),
        failure: Some(failure),
    }
}
