use super::{CacheError, ClassificationError, ConfigError, ExpansionError, RetrievalError};

/// Top-level error for every Lodestar crate.
#[derive(Debug, thiserror::Error)]
pub enum LodestarError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator (index backend, similarity provider, ...) failed in
    /// a way that has no dedicated variant.
    #[error("backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LodestarError {
    /// Shorthand for collaborator failures.
    pub fn backend(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means no signal could answer the request.
    pub fn is_retrieval_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Retrieval(RetrievalError::AllSignalsUnavailable { .. })
        )
    }
}

impl From<serde_json::Error> for LodestarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type LodestarResult<T> = Result<T, LodestarError>;
