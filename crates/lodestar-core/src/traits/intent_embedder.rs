use crate::errors::LodestarResult;

/// Embedding provider for the intent classifier's exemplar fallback.
pub trait IIntentEmbedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> LodestarResult<Vec<f32>>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool {
        true
    }
}
