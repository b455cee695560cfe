//! Span definitions per pipeline stage.

/// Create a retrieval request span.
#[macro_export]
macro_rules! retrieval_span {
    ($request_id:expr, $intent:expr) => {
        tracing::info_span!("lodestar.retrieval", request_id = %$request_id, intent = %$intent)
    };
}

/// Create a fan-out span.
#[macro_export]
macro_rules! fan_out_span {
    ($retriever_count:expr) => {
        tracing::debug_span!("lodestar.fan_out", retrievers = $retriever_count)
    };
}

/// Create a neighbor merge span.
#[macro_export]
macro_rules! merge_span {
    ($input_count:expr) => {
        tracing::debug_span!("lodestar.merge", input = $input_count)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RETRIEVAL: &str = "lodestar.retrieval";
    pub const FAN_OUT: &str = "lodestar.fan_out";
    pub const MERGE: &str = "lodestar.merge";
}
