use serde::{Deserialize, Serialize};

use super::{ChunkKind, Contribution, RetrieverTag};

/// Provenance of one chunk absorbed into a merged result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub chunk_id: String,
    pub sequence: u32,
    pub score: f64,
    pub contributions: Vec<Contribution>,
}

/// One or more adjacent fused chunks folded into a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    /// The highest-scoring chunk; the one that absorbed its neighbors.
    pub primary_chunk_id: String,
    /// Score of the primary chunk.
    pub score: f64,
    /// Absorbed chunks in document order.
    pub constituents: Vec<Constituent>,
    /// Union of contributing retrievers, in `RetrieverTag::ALL` order.
    pub retrievers: Vec<RetrieverTag>,
    pub document_id: String,
    pub section_id: String,
    pub section: Option<String>,
    pub start_offset: usize,
    pub end_offset: usize,
    pub kind: ChunkKind,
    pub text: String,
    /// Never exceeds the configured merge budget.
    pub token_count: usize,
}

impl MergedResult {
    /// Absorbed chunk IDs in document order.
    pub fn chunk_ids(&self) -> Vec<&str> {
        self.constituents.iter().map(|c| c.chunk_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Whether this result absorbed any neighbors.
    pub fn is_merged(&self) -> bool {
        self.constituents.len() > 1
    }
}
