use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lodestar_core::config::MergeConfig;
use lodestar_core::constants::WEIGHT_PROFILE_TOTAL;
use lodestar_core::intent::Intent;
use lodestar_core::models::{Candidate, ChunkKind, ChunkMetadata, RetrieverTag};
use lodestar_retrieval::{FusionEngine, NeighborMerger, WeightMatrix};
use lodestar_tokens::TokenCounter;
use proptest::prelude::*;
use test_fixtures::{chunk, MapSimilarity};

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop::sample::select(Intent::ALL.to_vec())
}

fn tag_subset() -> impl Strategy<Value = Vec<RetrieverTag>> {
    prop::sample::subsequence(RetrieverTag::ALL.to_vec(), 1..=RetrieverTag::COUNT)
}

/// Ranked ID lists per retriever; IDs drawn from a small pool so lists
/// overlap and occasionally repeat an ID within one list.
fn ranked_lists() -> impl Strategy<Value = Vec<(RetrieverTag, Vec<String>)>> {
    prop::collection::vec(prop::collection::vec(0u8..30, 0..15), RetrieverTag::COUNT).prop_map(|lists| {
        RetrieverTag::ALL
            .into_iter()
            .zip(lists)
            .map(|(tag, ids)| (tag, ids.into_iter().map(|i| format!("c{i}")).collect()))
            .collect()
    })
}

#[derive(Debug, Clone)]
struct ChunkLayout {
    document: u8,
    section: u8,
    tokens: usize,
    table: bool,
}

/// Twenty consecutive chunks spread over two documents and two sections.
fn layout() -> impl Strategy<Value = Vec<ChunkLayout>> {
    prop::collection::vec(
        (0u8..2, 0u8..2, 1usize..=600, prop::bool::weighted(0.2)).prop_map(
            |(document, section, tokens, table)| ChunkLayout {
                document,
                section,
                tokens,
                table,
            },
        ),
        20,
    )
}

fn metadata(i: usize, layout: &ChunkLayout) -> ChunkMetadata {
    let id = format!("c{i}");
    let mut builder = chunk(&id)
        .document(&format!("d{}", layout.document))
        .section(&format!("s{}", layout.section))
        .sequence(i as u32)
        .text(&format!("finding {i} in the trial results"))
        .tokens(layout.tokens);
    if layout.table {
        builder = builder.table();
    }
    builder.build()
}

proptest! {
    #[test]
    fn redistributed_weights_sum_to_one(intent in intent_strategy(), contributing in tag_subset()) {
        let matrix = WeightMatrix::default_weights();
        let effective = matrix.effective_profile(intent, &contributing);
        let total: f64 = effective.iter().sum();
        prop_assert!((total - WEIGHT_PROFILE_TOTAL).abs() < 1e-9, "sum was {}", total);
        for (slot, tag) in RetrieverTag::ALL.into_iter().enumerate() {
            if !contributing.contains(&tag) {
                prop_assert_eq!(effective[slot], 0.0);
            }
        }
    }

    #[test]
    fn fusion_never_duplicates_and_never_invents(intent in intent_strategy(), lists in ranked_lists()) {
        let engine = FusionEngine::new(Arc::new(WeightMatrix::default_weights()), 60);
        let lists: Vec<(RetrieverTag, Vec<Candidate>)> = lists
            .into_iter()
            .map(|(tag, ids)| {
                let candidates = ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| chunk(id).candidate(id, tag, i + 1))
                    .collect();
                (tag, candidates)
            })
            .collect();
        let total: usize = lists.iter().map(|(_, c)| c.len()).sum();
        let inputs: HashSet<&str> = lists
            .iter()
            .flat_map(|(_, c)| c.iter().map(|c| c.chunk_id.as_str()))
            .collect();

        let fused = engine.fuse(&lists, intent);

        prop_assert!(fused.len() <= total);
        prop_assert_eq!(fused.len(), inputs.len());
        let mut seen = HashSet::new();
        for result in &fused {
            prop_assert!(seen.insert(result.chunk_id.as_str()), "duplicate {}", result.chunk_id);
            prop_assert!(inputs.contains(result.chunk_id.as_str()));
        }
        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn merged_groups_respect_budget_sections_and_tables(layout in layout(), order in Just((0..20).collect::<Vec<usize>>()).prop_shuffle()) {
        let counter = TokenCounter::new(256).unwrap();
        let config = MergeConfig::default();
        let merger = NeighborMerger::new(&config, counter);
        let engine = FusionEngine::new(Arc::new(WeightMatrix::default_weights()), 60);

        let chunks: HashMap<String, ChunkMetadata> = layout
            .iter()
            .enumerate()
            .map(|(i, l)| (format!("c{i}"), metadata(i, l)))
            .collect();
        let candidates: Vec<Candidate> = order
            .iter()
            .enumerate()
            .map(|(rank, &i)| {
                let id = format!("c{i}");
                Candidate::new(id.as_str(), RetrieverTag::Lexical, rank + 1, 1.0, chunks[&id].clone())
            })
            .collect();
        let fused = engine.fuse(&[(RetrieverTag::Lexical, candidates)], Intent::General);
        let merged = merger.merge(&fused, &MapSimilarity::new().with_default(0.9));

        let mut covered = 0;
        for group in &merged {
            covered += group.len();
            prop_assert!(group.token_count <= config.max_merged_tokens);
            let first = &chunks[&group.constituents[0].chunk_id];
            for id in group.chunk_ids() {
                let meta = &chunks[id];
                prop_assert_eq!(&meta.document_id, &first.document_id);
                prop_assert_eq!(&meta.section_id, &first.section_id);
                if group.is_merged() {
                    prop_assert!(meta.kind != ChunkKind::Table, "table {} merged", id);
                }
            }
            for pair in group.constituents.windows(2) {
                prop_assert_eq!(pair[0].sequence + 1, pair[1].sequence);
            }
        }
        prop_assert_eq!(covered, fused.len());
    }
}
