use crate::errors::LodestarResult;

/// Pairwise chunk similarity provider used by the neighbor merger.
pub trait ISimilaritySource: Send + Sync {
    /// Cosine similarity in [0, 1] between two chunks.
    fn similarity(&self, chunk_a: &str, chunk_b: &str) -> LodestarResult<f64>;
}
