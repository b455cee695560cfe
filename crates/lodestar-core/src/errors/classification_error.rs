/// Intent classification errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("intent embedder unavailable: {reason}")]
    EmbedderUnavailable { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
