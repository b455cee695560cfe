use serde::{Deserialize, Serialize};

use super::RetrieverTag;

/// Content shape of a chunk. Tables are atomic and never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    #[default]
    Text,
    Table,
}

/// Location and content of a chunk inside its source document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub document_id: String,
    /// Hard boundary: chunks in different sections are never merged.
    pub section_id: String,
    /// Human-readable section heading, if known.
    pub section: Option<String>,
    /// Position of the chunk in document order. Adjacent chunks differ by 1.
    pub sequence: u32,
    pub start_offset: usize,
    pub end_offset: usize,
    pub kind: ChunkKind,
    pub text: String,
    /// Token count precomputed by the chunking pipeline, if available.
    pub token_count: Option<usize>,
}

/// One retrieval hit from one retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk_id: String,
    pub retriever: RetrieverTag,
    /// 1-based rank within this retriever's list.
    pub rank: usize,
    /// Retriever-local score. Not comparable across retrievers; fusion never reads it.
    pub raw_score: f64,
    pub metadata: ChunkMetadata,
}

impl Candidate {
    pub fn new(
        chunk_id: impl Into<String>,
        retriever: RetrieverTag,
        rank: usize,
        raw_score: f64,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            retriever,
            rank,
            raw_score,
            metadata,
        }
    }
}
