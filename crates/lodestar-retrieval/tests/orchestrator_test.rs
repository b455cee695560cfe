//! End-to-end orchestrator tests: fusion scenarios, cache behavior,
//! degradation, deadlines, cancellation, and generation bumps.

use std::sync::Arc;
use std::time::Duration;

use lodestar_core::config::LodestarConfig;
use lodestar_core::errors::{LodestarError, RetrievalError};
use lodestar_core::intent::Intent;
use lodestar_core::models::{IntentSource, PipelineState, RelationType, RetrievalRequest, RetrieverTag};
use lodestar_core::traits::{IConceptDictionary, IResultStore, ISignalRetriever};
use lodestar_retrieval::RetrievalOrchestrator;
use test_fixtures::{
    candidates, chunk, FailingDictionary, FailingResultStore, MapDictionary, MapSimilarity,
    MemoryResultStore, ScriptedRetriever, SlowDictionary,
};

use PipelineState::*;

struct Harness {
    orchestrator: RetrievalOrchestrator,
    retrievers: Vec<Arc<ScriptedRetriever>>,
}

impl Harness {
    fn new(config: LodestarConfig, retrievers: Vec<ScriptedRetriever>, similarity: MapSimilarity) -> Self {
        Self::with(config, retrievers, similarity, |b| b)
    }

    fn with(
        config: LodestarConfig,
        retrievers: Vec<ScriptedRetriever>,
        similarity: MapSimilarity,
        customize: impl FnOnce(lodestar_retrieval::OrchestratorBuilder) -> lodestar_retrieval::OrchestratorBuilder,
    ) -> Self {
        let retrievers: Vec<Arc<ScriptedRetriever>> = retrievers.into_iter().map(Arc::new).collect();
        let mut builder = RetrievalOrchestrator::builder(config).similarity(Arc::new(similarity));
        for r in &retrievers {
            builder = builder.retriever(Arc::clone(r) as Arc<dyn ISignalRetriever>);
        }
        let orchestrator = customize(builder).build().expect("orchestrator");
        Self {
            orchestrator,
            retrievers,
        }
    }

    fn calls(&self) -> usize {
        self.retrievers.iter().map(|r| r.calls()).sum()
    }

    fn retriever(&self, tag: RetrieverTag) -> &ScriptedRetriever {
        self.retrievers
            .iter()
            .find(|r| r.tag() == tag)
            .expect("retriever registered")
    }
}

fn scenario_one_retrievers() -> Vec<ScriptedRetriever> {
    vec![
        ScriptedRetriever::returning(RetrieverTag::Lexical, candidates(RetrieverTag::Lexical, &["A", "B", "C"])),
        ScriptedRetriever::returning(RetrieverTag::Sparse, candidates(RetrieverTag::Sparse, &["B", "A", "D"])),
        ScriptedRetriever::returning(RetrieverTag::Dense, candidates(RetrieverTag::Dense, &["A", "C"])),
        ScriptedRetriever::empty(RetrieverTag::Graph),
    ]
}

fn primary_ids(response: &lodestar_core::models::RetrievalResponse) -> Vec<&str> {
    response
        .results
        .iter()
        .map(|r| r.primary_chunk_id.as_str())
        .collect()
}

#[tokio::test]
async fn mortality_query_fuses_with_graph_weight_redistributed() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Endpoint);
    assert_eq!(response.intent_source, IntentSource::Rule);
    assert_eq!(primary_ids(&response), vec!["A", "B", "C", "D"]);
    assert_eq!(
        response.results[0].retrievers,
        vec![RetrieverTag::Lexical, RetrieverTag::Sparse, RetrieverTag::Dense]
    );
    // An empty list is an answer, not a degradation.
    assert!(response.degraded.is_empty());
    assert!(!response.cache_hit);
    assert_eq!(
        response.trace,
        vec![Received, Expanding, FanningOut, Fusing, Merging, Caching, Completed]
    );

    // Lexical 0.30, sparse 0.30, dense 0.25 renormalized over 0.85.
    let (l, s, d) = (0.30 / 0.85, 0.30 / 0.85, 0.25 / 0.85);
    let expected_a = l / 61.0 + s / 62.0 + d / 61.0;
    assert!((response.results[0].score - expected_a).abs() < 1e-12);
}

#[tokio::test]
async fn identical_query_within_ttl_is_served_from_cache() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let first = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    let calls_after_first = h.calls();

    let second = h
        .orchestrator
        .retrieve(RetrievalRequest::new("Does drugX  reduce mortality"))
        .await
        .unwrap();

    assert_eq!(calls_after_first, 4);
    assert_eq!(h.calls(), 4, "cache hit must not reach any retriever");
    assert!(second.cache_hit);
    assert_eq!(second.results, first.results);
    assert_eq!(second.trace, vec![Received, Expanding, Completed]);

    let snapshot = h.orchestrator.observability();
    assert_eq!(snapshot.metrics.cache_hits, 1);
    assert_eq!(snapshot.metrics.cache_misses, 1);
    assert_eq!(snapshot.query_count, 2);
}

#[tokio::test]
async fn adjacent_similar_chunks_merge_and_the_dissimilar_one_stays_separate() {
    let meta = |id: &str, seq: u32| chunk(id).document("doc").section("results").sequence(seq).tokens(300);
    let retrievers = vec![
        ScriptedRetriever::returning(
            RetrieverTag::Lexical,
            vec![
                meta("c1", 1).candidate("c1", RetrieverTag::Lexical, 1),
                meta("c2", 2).candidate("c2", RetrieverTag::Lexical, 2),
                meta("c3", 3).candidate("c3", RetrieverTag::Lexical, 3),
            ],
        ),
        ScriptedRetriever::empty(RetrieverTag::Sparse),
        ScriptedRetriever::empty(RetrieverTag::Dense),
        ScriptedRetriever::empty(RetrieverTag::Graph),
    ];
    let similarity = MapSimilarity::new().pair("c1", "c2", 0.75).pair("c2", "c3", 0.40);
    let h = Harness::new(LodestarConfig::default(), retrievers, similarity);

    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("primary outcome results"))
        .await
        .unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].chunk_ids(), vec!["c1", "c2"]);
    assert!(response.results[0].token_count <= 1_200);
    assert_eq!(response.results[1].chunk_ids(), vec!["c3"]);
}

#[tokio::test(start_paused = true)]
async fn all_signals_timing_out_is_a_retrieval_error() {
    let slow = |tag| ScriptedRetriever::empty(tag).with_delay(Duration::from_secs(5));
    let h = Harness::new(
        LodestarConfig::default(),
        RetrieverTag::ALL.into_iter().map(slow).collect(),
        MapSimilarity::new(),
    );

    let err = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap_err();

    assert!(err.is_retrieval_unavailable());
    assert!(matches!(
        err,
        LodestarError::Retrieval(RetrievalError::AllSignalsUnavailable { attempted: 4, .. })
    ));
    let snapshot = h.orchestrator.observability();
    assert_eq!(snapshot.metrics.failed_requests, 1);
    assert_eq!(snapshot.active_degradations.len(), 4);
}

#[tokio::test]
async fn one_failing_signal_degrades_without_failing_the_request() {
    let mut retrievers = scenario_one_retrievers();
    retrievers[2] = ScriptedRetriever::failing(RetrieverTag::Dense, "index offline");
    let h = Harness::new(LodestarConfig::default(), retrievers, MapSimilarity::new());

    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    assert_eq!(response.degraded, vec![RetrieverTag::Dense]);
    assert!(response.is_degraded());
    assert!(!response.results.is_empty());

    // Degraded results are not cached by default.
    let again = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    assert!(!again.cache_hit);
    assert_eq!(h.retriever(RetrieverTag::Lexical).calls(), 2);

    let degradations = h.orchestrator.degradations();
    assert!(degradations
        .iter()
        .any(|d| d.event.component == "retriever.dense" && d.event.failure.contains("index offline")));
}

#[tokio::test(start_paused = true)]
async fn request_deadline_returns_what_already_answered() {
    let mut config = LodestarConfig::default();
    config.retrieval.retriever_timeout_ms = 5_000;
    config.retrieval.request_deadline_ms = 300;

    let mut retrievers = scenario_one_retrievers();
    retrievers[2] = ScriptedRetriever::returning(RetrieverTag::Dense, candidates(RetrieverTag::Dense, &["Z"]))
        .with_delay(Duration::from_secs(1));
    let h = Harness::new(config, retrievers, MapSimilarity::new());

    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    assert_eq!(response.degraded, vec![RetrieverTag::Dense]);
    assert!(!primary_ids(&response).contains(&"Z"));
    assert_eq!(h.retriever(RetrieverTag::Dense).completed(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_expansion_counts_against_the_request_deadline() {
    let mut config = LodestarConfig::default();
    config.retrieval.retriever_timeout_ms = 5_000;
    config.retrieval.request_deadline_ms = 1_000;
    config.expansion.timeout_ms = 5_000;

    let dictionary = MapDictionary::new().entry("mi", "myocardial infarction", RelationType::Synonym, 0.95);
    let mut retrievers = scenario_one_retrievers();
    retrievers[2] = ScriptedRetriever::returning(RetrieverTag::Dense, candidates(RetrieverTag::Dense, &["Z"]))
        .with_delay(Duration::from_millis(500));
    let h = Harness::with(config, retrievers, MapSimilarity::new(), |b| {
        b.dictionary(Arc::new(SlowDictionary::new(dictionary, Duration::from_millis(700))))
    });

    let started = tokio::time::Instant::now();
    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("mortality after MI"))
        .await
        .unwrap();

    // Expansion finished at 700ms, leaving 300ms: not enough for the 500ms dense call.
    assert!(started.elapsed() <= Duration::from_millis(1_000));
    assert!(response.elapsed_ms <= 1_000);
    assert!(response.expanded_terms.is_expanded());
    assert_eq!(response.degraded, vec![RetrieverTag::Dense]);
    assert!(!primary_ids(&response).contains(&"Z"));
}

#[tokio::test]
async fn cached_degraded_result_keeps_its_degraded_retrievers() {
    let mut config = LodestarConfig::default();
    config.cache.cache_degraded = true;
    let mut retrievers = scenario_one_retrievers();
    retrievers[2] = ScriptedRetriever::failing(RetrieverTag::Dense, "index offline");
    let h = Harness::new(config, retrievers, MapSimilarity::new());

    let first = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    let second = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(second.degraded, vec![RetrieverTag::Dense]);
    assert!(second.is_degraded());
    assert_eq!(second.results, first.results);
    assert_eq!(h.retriever(RetrieverTag::Lexical).calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn caller_cancellation_aborts_in_flight_retriever_calls() {
    let mut config = LodestarConfig::default();
    config.retrieval.retriever_timeout_ms = 20_000;
    config.retrieval.request_deadline_ms = 30_000;

    let slow = |tag| ScriptedRetriever::empty(tag).with_delay(Duration::from_secs(10));
    let h = Harness::new(config, RetrieverTag::ALL.into_iter().map(slow).collect(), MapSimilarity::new());

    let cancelled = tokio::time::timeout(
        Duration::from_millis(100),
        h.orchestrator.retrieve(RetrievalRequest::new("dose of drugX")),
    )
    .await;
    assert!(cancelled.is_err());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.calls(), 4);
    assert!(h.retrievers.iter().all(|r| r.completed() == 0));
}

#[tokio::test(start_paused = true)]
async fn concurrent_identical_requests_share_one_computation() {
    let slow = |tag, ids: &[&str]| {
        ScriptedRetriever::returning(tag, candidates(tag, ids)).with_delay(Duration::from_millis(50))
    };
    let retrievers = vec![
        slow(RetrieverTag::Lexical, &["A", "B"]),
        slow(RetrieverTag::Sparse, &["B"]),
        slow(RetrieverTag::Dense, &["A"]),
        slow(RetrieverTag::Graph, &["C"]),
    ];
    let h = Harness::new(LodestarConfig::default(), retrievers, MapSimilarity::new());

    let request = RetrievalRequest::new("eligibility criteria for the trial");
    let (a, b) = tokio::join!(
        h.orchestrator.retrieve(request.clone()),
        h.orchestrator.retrieve(request.clone()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(h.calls(), 4);
    assert_eq!(a.results, b.results);
    assert!(!a.cache_hit && !b.cache_hit);
    assert_eq!(b.trace, vec![Received, Expanding, FanningOut, Fusing, Merging, Caching, Completed]);

    let third = h.orchestrator.retrieve(request).await.unwrap();
    assert!(third.cache_hit);
    assert_eq!(h.calls(), 4);
}

#[tokio::test]
async fn generation_bump_forces_a_fresh_computation() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let request = RetrievalRequest::new("does drugX reduce mortality");

    h.orchestrator.retrieve(request.clone()).await.unwrap();
    assert!(h.orchestrator.retrieve(request.clone()).await.unwrap().cache_hit);

    assert_eq!(h.orchestrator.bump_generation(), 1);
    let fresh = h.orchestrator.retrieve(request).await.unwrap();
    assert!(!fresh.cache_hit);
    assert_eq!(fresh.generation, 1);
    assert_eq!(h.calls(), 8);
}

#[tokio::test]
async fn blank_query_is_rejected_before_any_work() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let err = h.orchestrator.retrieve(RetrievalRequest::new("   ")).await.unwrap_err();
    assert!(matches!(err, LodestarError::Retrieval(RetrievalError::EmptyQuery)));
    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn intent_override_skips_classification() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality").with_intent(Intent::Dose))
        .await
        .unwrap();
    assert_eq!(response.intent, Intent::Dose);
    assert_eq!(response.intent_source, IntentSource::Override);
    assert_eq!(response.intent_confidence, 1.0);
}

#[tokio::test]
async fn limit_truncates_the_response_but_not_the_cached_entry() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let limited = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality").with_limit(2))
        .await
        .unwrap();
    assert_eq!(primary_ids(&limited), vec!["A", "B"]);

    let full = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    assert!(full.cache_hit);
    assert_eq!(full.results.len(), 4);
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let h = Harness::new(LodestarConfig::default(), scenario_one_retrievers(), MapSimilarity::new());
    let echoed = h
        .orchestrator
        .retrieve(RetrievalRequest::new("dose of drugX").with_request_id("client-42"))
        .await
        .unwrap();
    assert_eq!(echoed.request_id, "client-42");

    let generated = h.orchestrator.retrieve(RetrievalRequest::new("dose of drugX")).await.unwrap();
    assert!(!generated.request_id.is_empty());
    assert_ne!(generated.request_id, "client-42");
}

#[tokio::test]
async fn expansion_adds_dictionary_terms() {
    let dictionary = MapDictionary::new()
        .entry("mi", "myocardial infarction", RelationType::Synonym, 0.95)
        .entry("mi", "mitral insufficiency", RelationType::Synonym, 0.3);
    let h = Harness::with(
        LodestarConfig::default(),
        scenario_one_retrievers(),
        MapSimilarity::new(),
        |b| b.dictionary(Arc::new(dictionary) as Arc<dyn IConceptDictionary>),
    );
    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("mortality after MI"))
        .await
        .unwrap();

    let added: Vec<&str> = response
        .expanded_terms
        .additions
        .iter()
        .map(|a| a.term.as_str())
        .collect();
    assert_eq!(added, vec!["myocardial infarction"]);
    assert_eq!(response.expanded_terms.additions[0].source_term, "mi");
}

#[tokio::test]
async fn expansion_failure_falls_back_to_original_terms() {
    let h = Harness::with(
        LodestarConfig::default(),
        scenario_one_retrievers(),
        MapSimilarity::new(),
        |b| b.dictionary(Arc::new(FailingDictionary)),
    );
    let response = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    assert!(!response.expanded_terms.is_expanded());
    assert_eq!(response.expanded_terms.original, vec!["drugx", "reduce", "mortality"]);
    assert!(h
        .orchestrator
        .degradations()
        .iter()
        .any(|d| d.event.component == "expansion"));
}

#[tokio::test]
async fn persistent_store_serves_a_fresh_process() {
    let store = Arc::new(MemoryResultStore::new());
    let first = Harness::with(
        LodestarConfig::default(),
        scenario_one_retrievers(),
        MapSimilarity::new(),
        |b| b.result_store(Arc::clone(&store) as Arc<dyn IResultStore>),
    );
    let computed = first
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    // The write-through is detached; wait for it to land.
    for _ in 0..200 {
        if store.writes() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(store.writes(), 1);

    let second = Harness::with(
        LodestarConfig::default(),
        scenario_one_retrievers(),
        MapSimilarity::new(),
        |b| b.result_store(Arc::clone(&store) as Arc<dyn IResultStore>),
    );
    let served = second
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();

    assert!(served.cache_hit);
    assert_eq!(second.calls(), 0);
    assert_eq!(served.results, computed.results);
}

#[tokio::test]
async fn failing_store_is_treated_as_a_miss() {
    let store = Arc::new(FailingResultStore::new());
    let h = Harness::with(
        LodestarConfig::default(),
        scenario_one_retrievers(),
        MapSimilarity::new(),
        |b| b.result_store(Arc::clone(&store) as Arc<dyn IResultStore>),
    );

    let first = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.results.len(), 4);

    // The in-memory tier still works.
    let second = h
        .orchestrator
        .retrieve(RetrievalRequest::new("does drugX reduce mortality"))
        .await
        .unwrap();
    assert!(second.cache_hit);
    assert!(store.attempts() >= 1);
}

#[test]
fn builder_rejects_an_orchestrator_without_signals() {
    let result = RetrievalOrchestrator::builder(LodestarConfig::default()).build();
    assert!(matches!(
        result,
        Err(LodestarError::Retrieval(RetrievalError::NoRetrievers))
    ));
}

#[test]
fn builder_rejects_invalid_config() {
    let mut config = LodestarConfig::default();
    config.merge.similarity_threshold = 1.5;
    let result = RetrievalOrchestrator::builder(config)
        .retriever(Arc::new(ScriptedRetriever::empty(RetrieverTag::Lexical)))
        .build();
    assert!(matches!(result, Err(LodestarError::Config(_))));
}
