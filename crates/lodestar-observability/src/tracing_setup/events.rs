//! Structured log events for key pipeline occurrences.
//!
//! Each function emits a `tracing` event with structured fields.

/// A retriever timed out or failed and contributes nothing to this request.
pub fn signal_degraded(request_id: &str, retriever: &str, failure: &str) {
    tracing::warn!(
        event = "signal_degraded",
        request_id = %request_id,
        retriever = %retriever,
        failure = %failure,
        "signal degraded; weight redistributed"
    );
}

/// Every retriever failed; the request ends in the error state.
pub fn all_signals_unavailable(request_id: &str, attempted: usize) {
    tracing::error!(
        event = "all_signals_unavailable",
        request_id = %request_id,
        attempted = attempted,
        "retrieval unavailable"
    );
}

/// The intent classifier lost its embedder and fell back to rules only.
pub fn classifier_fallback(embedder: &str, reason: &str) {
    tracing::warn!(
        event = "classifier_fallback",
        embedder = %embedder,
        reason = %reason,
        "intent classifier degraded to rule-only mode"
    );
}

/// Ontology expansion failed or timed out; the original terms are used.
pub fn expansion_fallback(dictionary: &str, reason: &str) {
    tracing::warn!(
        event = "expansion_fallback",
        dictionary = %dictionary,
        reason = %reason,
        "expansion skipped; using original terms"
    );
}

/// A request was answered from the result cache.
pub fn cache_hit(request_id: &str, fingerprint: &str, tier: &str) {
    tracing::debug!(
        event = "cache_hit",
        request_id = %request_id,
        fingerprint = %fingerprint,
        tier = %tier,
        "result cache hit"
    );
}

/// A request joined a fill already in flight for the same fingerprint.
pub fn cache_fill_joined(request_id: &str, fingerprint: &str) {
    tracing::debug!(
        event = "cache_fill_joined",
        request_id = %request_id,
        fingerprint = %fingerprint,
        "awaiting in-flight computation"
    );
}

/// The persistent result store failed; treated as a miss.
pub fn cache_store_failure(operation: &str, reason: &str) {
    tracing::warn!(
        event = "cache_store_failure",
        operation = %operation,
        reason = %reason,
        "result store failure ignored"
    );
}

/// A merged result exceeded its token budget and was truncated.
pub fn merge_budget_repaired(chunk_id: &str, tokens: usize, budget: usize) {
    tracing::warn!(
        event = "merge_budget_repaired",
        chunk_id = %chunk_id,
        tokens = tokens,
        budget = budget,
        "merged text over budget; truncated"
    );
}

/// The index generation advanced and the cache was cleared.
pub fn generation_bumped(previous: u64, current: u64) {
    tracing::info!(
        event = "generation_bumped",
        previous = previous,
        current = current,
        "index generation bumped; result cache cleared"
    );
}

/// The orchestrator moved between pipeline states.
pub fn state_transition(request_id: &str, from: &str, to: &str) {
    tracing::trace!(
        event = "state_transition",
        request_id = %request_id,
        from = %from,
        to = %to,
        "pipeline state transition"
    );
}
