/// Result cache errors. Never fatal for a request: every cache error is
/// downgraded to a miss by the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("result store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("result store entry for {fingerprint} is corrupt: {reason}")]
    CorruptEntry { fingerprint: String, reason: String },
}
