//! RetrievalOrchestrator: owns the request lifecycle.
//!
//! received → expanding → (cache hit → completed)
//!                      → fanning_out → fusing → merging → caching → completed
//!
//! Classification and ontology expansion run concurrently while expanding.
//! Everything after that runs inside a single-flight cache fill shared by
//! all concurrent requests with the same fingerprint.

pub mod state;

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lodestar_core::config::LodestarConfig;
use lodestar_core::errors::{LodestarError, LodestarResult, RetrievalError};
use lodestar_core::intent::Intent;
use lodestar_core::models::{
    CacheEntry, DegradationEvent, ExpandedQuery, PipelineState, Query, QueryFilters,
    RetrievalRequest, RetrievalResponse,
};
use lodestar_core::traits::{
    IConceptDictionary, IIntentEmbedder, IResultStore, ISignalRetriever, ISimilaritySource,
};
use lodestar_observability::tracing_setup::events;
use lodestar_observability::{
    fan_out_span, merge_span, retrieval_span, ObservabilityEngine, ObservabilitySnapshot,
    QueryLogEntry, TrackedDegradation,
};
use lodestar_tokens::TokenCounter;
use tokio::time::Instant;
use tracing::{info, Instrument, Span};

use crate::cache::{fingerprint, CacheOutcome, Computed, IndexGeneration, ResultCache};
use crate::expansion::{ExpansionOutcome, OntologyExpander, StaticConceptDictionary};
use crate::intent::{IntentClassification, IntentEngine, WeightMatrix};
use crate::merge::NeighborMerger;
use crate::search::{FanOutResult, FusionEngine, SignalFanOut};

pub use state::StateTrace;

type SharedObservability = Arc<Mutex<ObservabilityEngine>>;

fn observe(observability: &Mutex<ObservabilityEngine>, f: impl FnOnce(&mut ObservabilityEngine)) {
    match observability.lock() {
        Ok(mut engine) => f(&mut engine),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}

/// Used when no similarity source is configured: every lookup fails, so
/// nothing merges.
struct NoSimilarity;

impl ISimilaritySource for NoSimilarity {
    fn similarity(&self, _a: &str, _b: &str) -> LodestarResult<f64> {
        Err(LodestarError::backend("similarity", "no similarity source configured"))
    }
}

/// Fan-out, fusion, and merge. Shared by every in-flight fill.
struct SignalPipeline {
    fan_out: SignalFanOut,
    fusion: FusionEngine,
    merger: NeighborMerger,
    similarity: Arc<dyn ISimilaritySource>,
    top_k: usize,
    observability: SharedObservability,
}

impl SignalPipeline {
    fn compute(
        self: Arc<Self>,
        request_id: String,
        expanded: ExpandedQuery,
        intent: Intent,
        filters: QueryFilters,
        fingerprint: String,
        generation: u64,
        deadline: Instant,
    ) -> impl Future<Output = Result<Computed, RetrievalError>> + Send + 'static {
        async move {
            let mut trace = StateTrace::resume(request_id.as_str(), PipelineState::Expanding);
            trace.advance(PipelineState::FanningOut)?;

            let outcome = self
                .fan_out
                .run(Arc::new(expanded), intent, Arc::new(filters), self.top_k, deadline)
                .instrument(fan_out_span!(self.fan_out.len()))
                .await;
            self.record_signals(&request_id, &outcome);

            if outcome.all_failed() {
                events::all_signals_unavailable(&request_id, outcome.outcomes.len());
                trace.fail();
                return Err(RetrievalError::AllSignalsUnavailable {
                    attempted: outcome.outcomes.len(),
                    details: outcome.failure_details(),
                });
            }

            trace.advance(PipelineState::Fusing)?;
            let fused = self.fusion.fuse(&outcome.lists(), intent);

            trace.advance(PipelineState::Merging)?;
            let merged = {
                let _span = merge_span!(fused.len()).entered();
                self.merger.merge(&fused, self.similarity.as_ref())
            };

            trace.advance(PipelineState::Caching)?;
            let entry = CacheEntry::new(fingerprint, intent, merged, generation)
                .with_degraded(outcome.degraded());
            Ok(Computed {
                entry: Arc::new(entry),
                states: trace.into_states(),
            })
        }
    }

    fn record_signals(&self, request_id: &str, outcome: &FanOutResult) {
        observe(&self.observability, |obs| {
            for signal in &outcome.outcomes {
                match &signal.failure {
                    Some(failure) => {
                        obs.record_signal_degraded(request_id, signal.retriever, &failure.to_string())
                    }
                    None => obs.record_signal_healthy(signal.retriever),
                }
            }
        });
    }
}

/// Builder for [`RetrievalOrchestrator`].
pub struct OrchestratorBuilder {
    config: LodestarConfig,
    retrievers: Vec<Arc<dyn ISignalRetriever>>,
    similarity: Option<Arc<dyn ISimilaritySource>>,
    dictionary: Option<Arc<dyn IConceptDictionary>>,
    embedder: Option<Arc<dyn IIntentEmbedder>>,
    store: Option<Arc<dyn IResultStore>>,
}

impl OrchestratorBuilder {
    /// Register a signal retriever. Call once per signal.
    pub fn retriever(mut self, retriever: Arc<dyn ISignalRetriever>) -> Self {
        self.retrievers.push(retriever);
        self
    }

    pub fn similarity(mut self, similarity: Arc<dyn ISimilaritySource>) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Concept dictionary for expansion. Defaults to the built-in clinical table.
    pub fn dictionary(mut self, dictionary: Arc<dyn IConceptDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Enables the classifier's exemplar-similarity fallback.
    pub fn embedder(mut self, embedder: Arc<dyn IIntentEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn result_store(mut self, store: Arc<dyn IResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> LodestarResult<RetrievalOrchestrator> {
        let config = self.config;
        config.validate()?;
        if self.retrievers.is_empty() {
            return Err(RetrievalError::NoRetrievers.into());
        }

        let matrix = WeightMatrix::from_config(&config.fusion)?;
        let mut intent = IntentEngine::new(config.intent.confidence_floor, matrix);
        if let Some(embedder) = self.embedder {
            intent = intent.with_embedder(embedder);
        }

        let dictionary = self
            .dictionary
            .unwrap_or_else(|| Arc::new(StaticConceptDictionary::new()));
        let expander = OntologyExpander::new(Some(dictionary), config.expansion.clone());

        let counter = TokenCounter::new(config.observability.token_cache_capacity)?;
        let observability: SharedObservability = Arc::new(Mutex::new(
            ObservabilityEngine::with_query_log_capacity(config.observability.query_log_capacity),
        ));

        let pipeline = SignalPipeline {
            fan_out: SignalFanOut::new(
                self.retrievers,
                Duration::from_millis(config.retrieval.retriever_timeout_ms),
            ),
            fusion: FusionEngine::new(Arc::clone(intent.matrix()), config.fusion.rrf_k),
            merger: NeighborMerger::new(&config.merge, counter),
            similarity: self.similarity.unwrap_or_else(|| Arc::new(NoSimilarity)),
            top_k: config.retrieval.top_k,
            observability: Arc::clone(&observability),
        };

        Ok(RetrievalOrchestrator {
            cache: ResultCache::new(&config.cache, self.store),
            config,
            intent,
            expander,
            pipeline: Arc::new(pipeline),
            generation: IndexGeneration::default(),
            observability,
        })
    }
}

/// The single retrieval entry point for downstream consumers.
pub struct RetrievalOrchestrator {
    config: LodestarConfig,
    intent: IntentEngine,
    expander: OntologyExpander,
    pipeline: Arc<SignalPipeline>,
    cache: ResultCache,
    generation: IndexGeneration,
    observability: SharedObservability,
}

impl RetrievalOrchestrator {
    pub fn builder(config: LodestarConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            retrievers: Vec::new(),
            similarity: None,
            dictionary: None,
            embedder: None,
            store: None,
        }
    }

    pub fn config(&self) -> &LodestarConfig {
        &self.config
    }

    /// Current index generation.
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// Version of the active weight table.
    pub fn weights_version(&self) -> &str {
        self.intent.matrix().version()
    }

    /// Run one retrieval request end to end.
    ///
    /// Fails only for an empty query or when every signal is unavailable;
    /// classification, expansion, cache, and single-signal failures degrade.
    /// The request deadline is measured from this call.
    pub async fn retrieve(&self, request: RetrievalRequest) -> LodestarResult<RetrievalResponse> {
        let started = Instant::now();
        let query = Query::from_request(&request);
        let span = retrieval_span!(query.request_id(), "unresolved");
        self.run(query, request.intent_override, request.limit, started)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        query: Query,
        intent_override: Option<Intent>,
        limit: Option<usize>,
        started: Instant,
    ) -> LodestarResult<RetrievalResponse> {
        let request_id = query.request_id().to_string();
        let mut trace = StateTrace::new(request_id.as_str());

        if query.is_blank() {
            trace.fail();
            observe(&self.observability, |obs| obs.record_failed(None));
            return Err(RetrievalError::EmptyQuery.into());
        }

        let deadline = started + Duration::from_millis(self.config.retrieval.request_deadline_ms);
        trace.advance(PipelineState::Expanding)?;
        let (classification, expansion) = tokio::join!(
            async { self.intent.resolve(query.text(), intent_override) },
            self.expander
                .expand_within(query.terms(), deadline.saturating_duration_since(Instant::now())),
        );
        let intent = classification.intent;
        Span::current().record("intent", intent.as_str());
        self.record_fallbacks(&request_id, &classification, &expansion);

        let generation = self.generation.current();
        let fingerprint = fingerprint(&query, intent, self.intent.matrix().version(), generation);
        let expanded_terms = expansion.terms;
        let expanded = ExpandedQuery {
            text: query.text().to_string(),
            terms: expanded_terms.clone(),
        };

        let fill = Arc::clone(&self.pipeline).compute(
            request_id.clone(),
            expanded,
            intent,
            query.filters().clone(),
            fingerprint.clone(),
            generation,
            deadline,
        );

        let outcome = match self.cache.get_or_compute(&fingerprint, generation, fill).await {
            Ok(outcome) => outcome,
            Err(e) => {
                trace.fail();
                observe(&self.observability, |obs| obs.record_failed(Some(intent)));
                return Err(e.into());
            }
        };

        let (entry, degraded, cache_hit) = match outcome {
            CacheOutcome::Hit { entry, tier } => {
                events::cache_hit(&request_id, &fingerprint, tier.as_str());
                let degraded = entry.degraded.clone();
                (entry, degraded, true)
            }
            CacheOutcome::Computed { computed, joined } => {
                if joined {
                    events::cache_fill_joined(&request_id, &fingerprint);
                }
                trace.absorb(&computed.states)?;
                let degraded = computed.entry.degraded.clone();
                (computed.entry, degraded, false)
            }
        };
        trace.advance(PipelineState::Completed)?;

        let limit = limit.unwrap_or(self.config.retrieval.max_results);
        let results: Vec<_> = entry.results.iter().take(limit).cloned().collect();
        let elapsed = started.elapsed();

        observe(&self.observability, |obs| {
            obs.record_completed(QueryLogEntry::new(
                request_id.as_str(),
                intent,
                elapsed,
                results.len(),
                cache_hit,
                degraded.len(),
            ))
        });
        info!(
            request_id = %request_id,
            intent = %intent,
            results = results.len(),
            cache_hit,
            degraded = degraded.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "retrieval complete"
        );

        Ok(RetrievalResponse {
            request_id,
            intent,
            intent_confidence: classification.confidence,
            intent_source: classification.source,
            results,
            degraded,
            cache_hit,
            generation,
            expanded_terms,
            trace: trace.visited().to_vec(),
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    fn record_fallbacks(
        &self,
        request_id: &str,
        classification: &IntentClassification,
        expansion: &ExpansionOutcome,
    ) {
        observe(&self.observability, |obs| {
            if let Some(reason) = &classification.fallback_reason {
                obs.record_degradation(
                    DegradationEvent::new("intent.embedder", reason.as_str(), "rule-only classification")
                        .for_request(request_id),
                );
            }
            if let Some(reason) = &expansion.fallback_reason {
                obs.record_degradation(
                    DegradationEvent::new("expansion", reason.as_str(), "original terms")
                        .for_request(request_id),
                );
            }
        });
    }

    /// Advance the index generation and drop every cached result.
    /// Returns the new generation.
    pub fn bump_generation(&self) -> u64 {
        let (previous, current) = self.generation.bump();
        self.cache.clear();
        events::generation_bumped(previous, current);
        current
    }

    /// Metrics, active degradations, and latency summary.
    pub fn observability(&self) -> ObservabilitySnapshot {
        let mut snapshot = None;
        observe(&self.observability, |obs| snapshot = Some(obs.snapshot()));
        snapshot.unwrap_or_else(|| ObservabilityEngine::new().snapshot())
    }

    /// Full degradation history.
    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        let mut events = Vec::new();
        observe(&self.observability, |obs| events = obs.degradation.events().to_vec());
        events
    }

    /// Logged queries, oldest first.
    pub fn recent_queries(&self) -> Vec<QueryLogEntry> {
        let mut entries = Vec::new();
        observe(&self.observability, |obs| entries = obs.query_log.entries().cloned().collect());
        entries
    }
}
