//! Chunk and candidate builders.

use lodestar_core::models::{Candidate, ChunkKind, ChunkMetadata, RetrieverTag};

/// Fluent builder for [`ChunkMetadata`].
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    meta: ChunkMetadata,
}

/// Start a chunk. Defaults: its own document, section `s0`, sequence 0,
/// text equal to the ID, 10 tokens.
pub fn chunk(id: &str) -> ChunkBuilder {
    ChunkBuilder {
        meta: ChunkMetadata {
            document_id: format!("doc-{id}"),
            section_id: "s0".to_string(),
            text: id.to_string(),
            token_count: Some(10),
            ..Default::default()
        },
    }
}

impl ChunkBuilder {
    pub fn document(mut self, document_id: &str) -> Self {
        self.meta.document_id = document_id.to_string();
        self
    }

    pub fn section(mut self, section_id: &str) -> Self {
        self.meta.section_id = section_id.to_string();
        self
    }

    /// Position in the document; offsets follow at 100 bytes per chunk.
    pub fn sequence(mut self, sequence: u32) -> Self {
        self.meta.sequence = sequence;
        self.meta.start_offset = sequence as usize * 100;
        self.meta.end_offset = sequence as usize * 100 + 99;
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.meta.text = text.to_string();
        self
    }

    pub fn tokens(mut self, tokens: usize) -> Self {
        self.meta.token_count = Some(tokens);
        self
    }

    /// Let the merger count tokens itself.
    pub fn uncounted(mut self) -> Self {
        self.meta.token_count = None;
        self
    }

    pub fn table(mut self) -> Self {
        self.meta.kind = ChunkKind::Table;
        self
    }

    pub fn build(self) -> ChunkMetadata {
        self.meta
    }

    /// A candidate for this chunk at the given 1-based rank.
    pub fn candidate(self, id: &str, retriever: RetrieverTag, rank: usize) -> Candidate {
        Candidate::new(id, retriever, rank, 1.0 / rank as f64, self.meta)
    }
}

/// Ranked candidates for chunk IDs with default metadata (one document per chunk).
pub fn candidates(retriever: RetrieverTag, ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| chunk(id).candidate(id, retriever, i + 1))
        .collect()
}
