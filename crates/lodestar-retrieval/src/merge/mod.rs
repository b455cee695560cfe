//! NeighborMerger: fold adjacent, highly similar fused chunks into one unit.
//!
//! Greedy by score rank: the best-scoring unabsorbed chunk claims its
//! document neighbors first. A group grows one chunk at a time at either
//! edge while the neighbor is in the fused list, shares the document and
//! section, is not a table, clears the similarity threshold against the
//! group's edge chunk, and keeps the group within the token budget. The
//! budget counts the separator joined in between constituents.

use std::collections::HashMap;

use lodestar_core::config::MergeConfig;
use lodestar_core::models::{ChunkKind, Constituent, FusedResult, MergedResult, RetrieverTag};
use lodestar_core::traits::ISimilaritySource;
use lodestar_observability::tracing_setup::events;
use lodestar_tokens::{TokenBudget, TokenCounter};
use tracing::debug;

/// Separator placed between constituent texts.
const JOIN_SEPARATOR: &str = "\n";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

pub struct NeighborMerger {
    similarity_threshold: f64,
    max_merged_tokens: usize,
    counter: TokenCounter,
}

impl NeighborMerger {
    pub fn new(config: &MergeConfig, counter: TokenCounter) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            max_merged_tokens: config.max_merged_tokens,
            counter,
        }
    }

    pub fn max_merged_tokens(&self) -> usize {
        self.max_merged_tokens
    }

    /// Merge a score-ordered fused list. Output keeps the score order of
    /// each group's primary chunk.
    pub fn merge(&self, fused: &[FusedResult], similarity: &dyn ISimilaritySource) -> Vec<MergedResult> {
        let budget = TokenBudget::new(&self.counter, self.max_merged_tokens);
        let separator = self.counter.count_cached(JOIN_SEPARATOR);
        let tokens: Vec<usize> = fused
            .iter()
            .map(|f| {
                f.metadata
                    .token_count
                    .unwrap_or_else(|| self.counter.count_cached(&f.metadata.text))
            })
            .collect();

        // (document, section, sequence) → index; first (best-scoring) wins.
        let mut positions: HashMap<(&str, &str, u32), usize> = HashMap::new();
        for (i, f) in fused.iter().enumerate() {
            positions
                .entry((
                    f.metadata.document_id.as_str(),
                    f.metadata.section_id.as_str(),
                    f.metadata.sequence,
                ))
                .or_insert(i);
        }

        let mut absorbed = vec![false; fused.len()];
        let mut merged = Vec::new();

        for seed in 0..fused.len() {
            if absorbed[seed] {
                continue;
            }
            absorbed[seed] = true;

            let mut group = vec![seed];
            let seed_meta = &fused[seed].metadata;
            if seed_meta.kind != ChunkKind::Table && tokens[seed] <= self.max_merged_tokens {
                let mut used = tokens[seed];
                let (mut low, mut high) = (seed, seed);
                let mut open = [true, true];

                while open[0] || open[1] {
                    let left = open[0]
                        .then(|| self.neighbor(fused, &positions, &absorbed, low, Side::Left))
                        .flatten();
                    let right = open[1]
                        .then(|| self.neighbor(fused, &positions, &absorbed, high, Side::Right))
                        .flatten();
                    if left.is_none() {
                        open[0] = false;
                    }
                    if right.is_none() {
                        open[1] = false;
                    }

                    // Better-scoring neighbor first.
                    let mut tries: Vec<(Side, usize)> = Vec::with_capacity(2);
                    tries.extend(left.map(|i| (Side::Left, i)));
                    tries.extend(right.map(|i| (Side::Right, i)));
                    tries.sort_by_key(|(_, i)| *i);

                    for (side, candidate) in tries {
                        let edge = if side == Side::Left { low } else { high };
                        let additional = tokens[candidate].saturating_add(separator);
                        let accept = budget.admits(used, additional)
                            && self.similar(similarity, &fused[edge], &fused[candidate]);
                        let side_index = if side == Side::Left { 0 } else { 1 };
                        if !accept {
                            open[side_index] = false;
                            continue;
                        }
                        absorbed[candidate] = true;
                        used += additional;
                        group.push(candidate);
                        if side == Side::Left {
                            low = candidate;
                        } else {
                            high = candidate;
                        }
                        break;
                    }
                }
            }

            merged.push(self.build(fused, &tokens, group, &budget));
        }

        debug!(input = fused.len(), output = merged.len(), "neighbor merge complete");
        merged
    }

    /// Index of the unabsorbed, non-table chunk adjacent to `edge` on `side`.
    fn neighbor(
        &self,
        fused: &[FusedResult],
        positions: &HashMap<(&str, &str, u32), usize>,
        absorbed: &[bool],
        edge: usize,
        side: Side,
    ) -> Option<usize> {
        let meta = &fused[edge].metadata;
        let sequence = match side {
            Side::Left => meta.sequence.checked_sub(1)?,
            Side::Right => meta.sequence.checked_add(1)?,
        };
        let index = *positions.get(&(meta.document_id.as_str(), meta.section_id.as_str(), sequence))?;
        let candidate = &fused[index];
        (!absorbed[index] && candidate.metadata.kind != ChunkKind::Table).then_some(index)
    }

    /// Similarity at or above the threshold. A provider error means no merge.
    fn similar(&self, similarity: &dyn ISimilaritySource, a: &FusedResult, b: &FusedResult) -> bool {
        match similarity.similarity(&a.chunk_id, &b.chunk_id) {
            Ok(score) => score.is_finite() && score >= self.similarity_threshold,
            Err(e) => {
                debug!(a = %a.chunk_id, b = %b.chunk_id, error = %e, "similarity unavailable; not merging");
                false
            }
        }
    }

    fn build(&self, fused: &[FusedResult], tokens: &[usize], mut group: Vec<usize>, budget: &TokenBudget<'_>) -> MergedResult {
        let primary = &fused[group[0]];
        group.sort_by_key(|&i| fused[i].metadata.sequence);

        let mut retrievers: Vec<RetrieverTag> = group
            .iter()
            .flat_map(|&i| fused[i].retrievers())
            .collect();
        retrievers.sort();
        retrievers.dedup();

        let constituents: Vec<Constituent> = group
            .iter()
            .map(|&i| Constituent {
                chunk_id: fused[i].chunk_id.clone(),
                sequence: fused[i].metadata.sequence,
                score: fused[i].score,
                contributions: fused[i].contributions.clone(),
            })
            .collect();

        let (mut text, mut token_count) = if group.len() == 1 {
            (primary.metadata.text.clone(), tokens[group[0]])
        } else {
            let joined = group
                .iter()
                .map(|&i| fused[i].metadata.text.as_str())
                .collect::<Vec<_>>()
                .join(JOIN_SEPARATOR);
            let count = self.counter.count_cached(&joined);
            (joined, count)
        };

        if token_count > self.max_merged_tokens {
            let (trimmed, count) = budget.truncate_to_fit(&text);
            events::merge_budget_repaired(&primary.chunk_id, token_count, self.max_merged_tokens);
            text = trimmed;
            token_count = count;
        }

        MergedResult {
            primary_chunk_id: primary.chunk_id.clone(),
            score: primary.score,
            constituents,
            retrievers,
            document_id: primary.metadata.document_id.clone(),
            section_id: primary.metadata.section_id.clone(),
            section: primary.metadata.section.clone(),
            start_offset: group
                .iter()
                .map(|&i| fused[i].metadata.start_offset)
                .min()
                .unwrap_or(primary.metadata.start_offset),
            end_offset: group
                .iter()
                .map(|&i| fused[i].metadata.end_offset)
                .max()
                .unwrap_or(primary.metadata.end_offset),
            kind: primary.metadata.kind,
            text,
            token_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use lodestar_core::errors::{LodestarError, LodestarResult};
    use lodestar_core::models::{ChunkMetadata, Contribution};

    use super::*;

    struct PairSimilarity(Vec<(&'static str, &'static str, f64)>);

    impl ISimilaritySource for PairSimilarity {
        fn similarity(&self, a: &str, b: &str) -> LodestarResult<f64> {
            if a == "err" || b == "err" {
                return Err(LodestarError::backend("embeddings", "offline"));
            }
            Ok(self
                .0
                .iter()
                .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
                .map(|(_, _, s)| *s)
                .unwrap_or(0.0))
        }
    }

    fn fused(id: &str, section: &str, sequence: u32, score: f64, tokens: usize) -> FusedResult {
        FusedResult {
            chunk_id: id.to_string(),
            score,
            contributions: vec![Contribution {
                retriever: RetrieverTag::Dense,
                rank: 1,
            }],
            metadata: ChunkMetadata {
                document_id: "doc".into(),
                section_id: section.into(),
                sequence,
                start_offset: sequence as usize * 100,
                end_offset: sequence as usize * 100 + 99,
                text: format!("chunk {id}"),
                token_count: Some(tokens),
                ..Default::default()
            },
        }
    }

    fn merger() -> NeighborMerger {
        NeighborMerger::new(&MergeConfig::default(), TokenCounter::new(64).unwrap())
    }

    #[test]
    fn similar_neighbor_merges_and_dissimilar_one_stays_separate() {
        let list = vec![
            fused("c1", "s", 1, 0.9, 300),
            fused("c2", "s", 2, 0.8, 300),
            fused("c3", "s", 3, 0.7, 300),
        ];
        let sim = PairSimilarity(vec![("c1", "c2", 0.75), ("c2", "c3", 0.40)]);
        let merged = merger().merge(&list, &sim);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chunk_ids(), vec!["c1", "c2"]);
        assert_eq!(merged[0].score, 0.9);
        assert_eq!(merged[0].start_offset, 100);
        assert_eq!(merged[0].end_offset, 299);
        assert_eq!(merged[1].chunk_ids(), vec!["c3"]);
    }

    #[test]
    fn highest_score_claims_neighbors_and_constituents_stay_in_document_order() {
        let list = vec![
            fused("mid", "s", 5, 0.9, 100),
            fused("left", "s", 4, 0.5, 100),
            fused("right", "s", 6, 0.6, 100),
        ];
        let sim = PairSimilarity(vec![("mid", "left", 0.9), ("mid", "right", 0.9)]);
        let merged = merger().merge(&list, &sim);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].primary_chunk_id, "mid");
        assert_eq!(merged[0].chunk_ids(), vec!["left", "mid", "right"]);
    }

    #[test]
    fn section_boundaries_and_tables_are_never_crossed() {
        let mut table = fused("tbl", "s", 2, 0.8, 50);
        table.metadata.kind = ChunkKind::Table;
        let list = vec![
            fused("a", "s", 1, 0.9, 50),
            table,
            fused("b", "other", 0, 0.7, 50),
        ];
        let sim = PairSimilarity(vec![("a", "tbl", 1.0), ("a", "b", 1.0)]);
        let merged = merger().merge(&list, &sim);

        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|m| !m.is_merged()));
        assert_eq!(merged[1].kind, ChunkKind::Table);
    }

    #[test]
    fn budget_stops_growth() {
        let list = vec![fused("a", "s", 1, 0.9, 700), fused("b", "s", 2, 0.8, 700)];
        let sim = PairSimilarity(vec![("a", "b", 0.99)]);
        let merged = merger().merge(&list, &sim);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn separator_tokens_count_against_the_budget() {
        let m = merger();
        let separator = m.counter.count_cached(JOIN_SEPARATOR);
        assert!(separator > 0);
        let sim = PairSimilarity(vec![("a", "b", 0.99)]);

        // Exactly half the budget each: the joined text would overshoot.
        let list = vec![fused("a", "s", 1, 0.9, 600), fused("b", "s", 2, 0.8, 600)];
        let merged = m.merge(&list, &sim);
        assert_eq!(merged.len(), 2);

        // Leaving room for the separator merges without truncation.
        let list = vec![
            fused("a", "s", 1, 0.9, 600),
            fused("b", "s", 2, 0.8, 600 - separator),
        ];
        let merged = m.merge(&list, &sim);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "chunk a\nchunk b");
        assert!(merged[0].token_count <= m.max_merged_tokens());
    }

    #[test]
    fn similarity_errors_mean_no_merge() {
        let list = vec![fused("err", "s", 1, 0.9, 10), fused("b", "s", 2, 0.8, 10)];
        let merged = merger().merge(&list, &PairSimilarity(Vec::new()));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn oversized_single_chunk_is_truncated_to_budget() {
        let mut big = fused("big", "s", 1, 0.9, 0);
        big.metadata.token_count = None;
        big.metadata.text = "word ".repeat(3_000);
        let merged = merger().merge(&[big], &PairSimilarity(Vec::new()));

        assert_eq!(merged.len(), 1);
        assert!(merged[0].token_count <= 1_200);
        assert!(merged[0].text.len() < 15_000);
    }
}
