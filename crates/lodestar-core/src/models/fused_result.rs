use serde::{Deserialize, Serialize};

use super::{ChunkMetadata, RetrieverTag};

/// One retriever's vote for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub retriever: RetrieverTag,
    pub rank: usize,
}

/// A chunk after rank fusion. At most one per chunk ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedResult {
    pub chunk_id: String,
    /// Weighted RRF score, derived from contributing ranks only.
    pub score: f64,
    /// Contributing retrievers in `RetrieverTag::ALL` order.
    pub contributions: Vec<Contribution>,
    pub metadata: ChunkMetadata,
}

impl FusedResult {
    /// Best (lowest) rank across contributing retrievers.
    pub fn best_rank(&self) -> usize {
        self.contributions
            .iter()
            .map(|c| c.rank)
            .min()
            .unwrap_or(usize::MAX)
    }

    pub fn retrievers(&self) -> Vec<RetrieverTag> {
        self.contributions.iter().map(|c| c.retriever).collect()
    }

    pub fn contributor_count(&self) -> usize {
        self.contributions.len()
    }
}
