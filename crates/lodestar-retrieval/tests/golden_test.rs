//! Golden scenarios: each file under `test-fixtures/golden/` scripts the
//! four signals and the expected merged output for one query.

use std::collections::BTreeMap;
use std::sync::Arc;

use lodestar_core::config::LodestarConfig;
use lodestar_core::intent::Intent;
use lodestar_core::models::{Candidate, ChunkKind, RetrievalRequest, RetrieverTag};
use lodestar_retrieval::RetrievalOrchestrator;
use serde::Deserialize;
use test_fixtures::{chunk, list_fixtures, load_fixture, MapSimilarity, ScriptedRetriever};

#[derive(Debug, Deserialize)]
struct ChunkSpec {
    document: String,
    section: String,
    sequence: u32,
    tokens: usize,
    #[serde(default)]
    kind: ChunkKind,
}

#[derive(Debug, Deserialize)]
struct GoldenScenario {
    name: String,
    query: String,
    expected_intent: Intent,
    signals: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    chunks: BTreeMap<String, ChunkSpec>,
    #[serde(default)]
    similarity: Vec<(String, String, f64)>,
    expected_results: Vec<Vec<String>>,
    expected_retrievers_of_first: Vec<String>,
}

impl GoldenScenario {
    fn candidates(&self, tag: RetrieverTag) -> Vec<Candidate> {
        let Some(ids) = self.signals.get(tag.as_str()) else {
            return Vec::new();
        };
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut builder = chunk(id);
                if let Some(spec) = self.chunks.get(id) {
                    builder = builder
                        .document(&spec.document)
                        .section(&spec.section)
                        .sequence(spec.sequence)
                        .tokens(spec.tokens);
                    if spec.kind == ChunkKind::Table {
                        builder = builder.table();
                    }
                }
                builder.candidate(id, tag, i + 1)
            })
            .collect()
    }

    fn similarity(&self) -> MapSimilarity {
        self.similarity
            .iter()
            .fold(MapSimilarity::new(), |map, (a, b, s)| map.pair(a, b, *s))
    }
}

async fn run_scenario(file_name: &str) {
    let scenario: GoldenScenario = load_fixture(file_name);

    let mut builder = RetrievalOrchestrator::builder(LodestarConfig::default())
        .similarity(Arc::new(scenario.similarity()));
    for tag in RetrieverTag::ALL {
        builder = builder.retriever(Arc::new(ScriptedRetriever::returning(tag, scenario.candidates(tag))));
    }
    let orchestrator = builder.build().expect("orchestrator");

    let response = orchestrator
        .retrieve(RetrievalRequest::new(scenario.query.as_str()))
        .await
        .unwrap_or_else(|e| panic!("{}: {e}", scenario.name));

    assert_eq!(response.intent, scenario.expected_intent, "{}", scenario.name);

    let groups: Vec<Vec<&str>> = response.results.iter().map(|r| r.chunk_ids()).collect();
    assert_eq!(groups, scenario.expected_results, "{}", scenario.name);

    let first: Vec<&str> = response.results[0]
        .retrievers
        .iter()
        .map(|tag| tag.as_str())
        .collect();
    assert_eq!(first, scenario.expected_retrievers_of_first, "{}", scenario.name);
}

#[tokio::test]
async fn all_golden_scenarios_match() {
    let files = list_fixtures();
    assert!(!files.is_empty(), "no golden scenarios found");
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("utf-8 fixture name");
        run_scenario(name).await;
    }
}
