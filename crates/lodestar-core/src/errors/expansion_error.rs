/// Ontology expansion errors.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    #[error("concept dictionary unavailable: {reason}")]
    DictionaryUnavailable { reason: String },

    #[error("expansion timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
