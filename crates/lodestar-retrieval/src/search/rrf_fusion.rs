//! Weighted Reciprocal Rank Fusion: score = Σ w(intent, r) / (k + rank_r)
//!
//! Combines the per-retriever ranked lists into one ranking without
//! normalizing heterogeneous raw scores. Weights of retrievers that
//! contributed nothing are redistributed onto the ones that did.

use std::collections::HashMap;
use std::sync::Arc;

use lodestar_core::intent::Intent;
use lodestar_core::models::{Candidate, ChunkMetadata, Contribution, FusedResult, RetrieverTag};

use crate::intent::weight_matrix::slot;
use crate::intent::WeightMatrix;

/// One RRF partial score.
pub fn rrf_partial(weight: f64, k: u32, rank: usize) -> f64 {
    weight / (k as f64 + rank as f64)
}

/// Fusion engine over a fixed weight matrix.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    matrix: Arc<WeightMatrix>,
    /// RRF smoothing constant (default 60).
    rrf_k: u32,
}

struct Accumulator {
    metadata: ChunkMetadata,
    ranks: [Option<usize>; RetrieverTag::COUNT],
}

impl FusionEngine {
    pub fn new(matrix: Arc<WeightMatrix>, rrf_k: u32) -> Self {
        Self { matrix, rrf_k }
    }

    pub fn rrf_k(&self) -> u32 {
        self.rrf_k
    }

    /// Fuse per-retriever candidate lists into a single ranking.
    ///
    /// Within one retriever's list the first occurrence of a chunk wins; a
    /// rank of 0 is read as the candidate's 1-based list position. The
    /// result has at most one entry per chunk ID and is totally ordered:
    /// score desc, contributor count desc, best rank asc, chunk ID asc.
    pub fn fuse(&self, lists: &[(RetrieverTag, Vec<Candidate>)], intent: Intent) -> Vec<FusedResult> {
        let mut order: Vec<String> = Vec::new();
        let mut chunks: HashMap<String, Accumulator> = HashMap::new();
        let mut contributing = [false; RetrieverTag::COUNT];

        for retriever in RetrieverTag::ALL {
            for (tag, candidates) in lists.iter().filter(|(tag, _)| *tag == retriever) {
                for (position, candidate) in candidates.iter().enumerate() {
                    let rank = if candidate.rank == 0 {
                        position + 1
                    } else {
                        candidate.rank
                    };
                    let acc = chunks.entry(candidate.chunk_id.clone()).or_insert_with(|| {
                        order.push(candidate.chunk_id.clone());
                        Accumulator {
                            metadata: candidate.metadata.clone(),
                            ranks: [None; RetrieverTag::COUNT],
                        }
                    });
                    let seen = &mut acc.ranks[slot(*tag)];
                    if seen.is_none() {
                        *seen = Some(rank);
                        contributing[slot(*tag)] = true;
                    }
                }
            }
        }

        let surviving: Vec<RetrieverTag> = RetrieverTag::ALL
            .into_iter()
            .filter(|r| contributing[slot(*r)])
            .collect();
        let weights = self.matrix.effective_profile(intent, &surviving);

        let mut fused: Vec<FusedResult> = order
            .into_iter()
            .filter_map(|chunk_id| {
                let acc = chunks.remove(&chunk_id)?;
                let mut score = 0.0;
                let mut contributions = Vec::new();
                for retriever in RetrieverTag::ALL {
                    if let Some(rank) = acc.ranks[slot(retriever)] {
                        score += rrf_partial(weights[slot(retriever)], self.rrf_k, rank);
                        contributions.push(Contribution { retriever, rank });
                    }
                }
                Some(FusedResult {
                    chunk_id,
                    score,
                    contributions,
                    metadata: acc.metadata,
                })
            })
            .collect();

        fused.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.contributor_count().cmp(&a.contributor_count()))
                .then_with(|| a.best_rank().cmp(&b.best_rank()))
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        fused
    }
}
