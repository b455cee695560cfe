use crate::errors::LodestarResult;
use crate::models::CacheEntry;

/// Optional persistent tier behind the in-memory result cache.
///
/// Every error is treated as a miss by the cache.
pub trait IResultStore: Send + Sync {
    fn get(&self, fingerprint: &str) -> LodestarResult<Option<CacheEntry>>;

    fn put(&self, entry: &CacheEntry) -> LodestarResult<()>;

    /// Drop every stored entry (generation bump).
    fn clear(&self) -> LodestarResult<()>;
}
