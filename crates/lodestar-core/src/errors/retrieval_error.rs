/// Retrieval pipeline errors.
///
/// `Clone` so one failed in-flight fill can be handed to every caller
/// that joined it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetrievalError {
    #[error("query text is empty")]
    EmptyQuery,

    #[error("no signal retrievers registered")]
    NoRetrievers,

    #[error("retrieval unavailable: all {attempted} signals failed ({details})")]
    AllSignalsUnavailable { attempted: usize, details: String },

    #[error("signal {retriever} failed: {reason}")]
    SignalFailed { retriever: String, reason: String },

    #[error("signal {retriever} timed out after {timeout_ms}ms")]
    SignalTimeout { retriever: String, timeout_ms: u64 },

    #[error("illegal pipeline transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}
