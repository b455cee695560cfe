//! ResultCache: memoized merged results with single-flight fills.
//!
//! L1 is a `moka` TTL cache. An optional `IResultStore` sits behind it;
//! store reads happen on L1 miss and writes are detached, so they finish
//! even if every caller goes away. Concurrent misses for one fingerprint
//! share one fill. The fill is dropped (cancelling its retriever calls)
//! only when its last waiter leaves before it completes.

pub mod fingerprint;
pub mod generation;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use lodestar_core::config::CacheConfig;
use lodestar_core::errors::{CacheError, RetrievalError};
use lodestar_core::models::{CacheEntry, PipelineState};
use lodestar_core::traits::IResultStore;
use lodestar_observability::tracing_setup::events;
use moka::sync::Cache;
use tracing::debug;

pub use fingerprint::fingerprint;
pub use generation::IndexGeneration;

/// Where a hit was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Store,
}

impl CacheTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Store => "store",
        }
    }
}

/// A freshly computed pipeline result. Retrievers that failed or timed
/// out during the computation are recorded on the entry itself.
#[derive(Debug, Clone)]
pub struct Computed {
    pub entry: Arc<CacheEntry>,
    /// States the computing request passed through after `expanding`.
    pub states: Vec<PipelineState>,
}

/// Result of a read-through lookup.
#[derive(Debug, Clone)]
pub enum CacheOutcome {
    Hit { entry: Arc<CacheEntry>, tier: CacheTier },
    /// `joined` is true when another request's fill was awaited.
    Computed { computed: Computed, joined: bool },
}

type Fill = Shared<BoxFuture<'static, Result<Computed, RetrievalError>>>;

struct InFlight {
    fill: Fill,
    waiters: Arc<AtomicUsize>,
}

/// Leaves the in-flight table when the last waiter of a fill drops.
struct WaiterGuard {
    in_flight: Arc<DashMap<String, InFlight>>,
    fingerprint: String,
    waiters: Arc<AtomicUsize>,
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        self.waiters.fetch_sub(1, Ordering::AcqRel);
        release_if_idle(&self.in_flight, &self.fingerprint, &self.waiters);
    }
}

/// Remove the fill for `fingerprint` if it is still `waiters`' fill and
/// nobody is waiting on it. The count is read under the shard lock, the
/// same lock a joining request holds while it increments.
fn release_if_idle(in_flight: &DashMap<String, InFlight>, fingerprint: &str, waiters: &Arc<AtomicUsize>) {
    in_flight.remove_if(fingerprint, |_, f| {
        Arc::ptr_eq(&f.waiters, waiters) && f.waiters.load(Ordering::Acquire) == 0
    });
}

pub struct ResultCache {
    entries: Cache<String, Arc<CacheEntry>>,
    in_flight: Arc<DashMap<String, InFlight>>,
    store: Option<Arc<dyn IResultStore>>,
    ttl: Duration,
    enabled: bool,
    cache_degraded: bool,
}

impl ResultCache {
    pub fn new(config: &CacheConfig, store: Option<Arc<dyn IResultStore>>) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs.max(1));
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_entries)
                .time_to_live(ttl)
                .build(),
            in_flight: Arc::new(DashMap::new()),
            store,
            ttl,
            enabled: config.enabled,
            cache_degraded: config.cache_degraded,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a fingerprint in both tiers. Expired or other-generation
    /// entries are misses.
    pub async fn get(&self, fingerprint: &str, generation: u64) -> Option<(Arc<CacheEntry>, CacheTier)> {
        if !self.enabled {
            return None;
        }
        if let Some(entry) = self.memory_get(fingerprint, generation) {
            return Some((entry, CacheTier::Memory));
        }
        let entry = self.store_get(fingerprint, generation).await?;
        self.entries.insert(fingerprint.to_string(), Arc::clone(&entry));
        Some((entry, CacheTier::Store))
    }

    /// Insert into both tiers, bypassing single-flight.
    pub fn put(&self, entry: CacheEntry) {
        if !self.enabled {
            return;
        }
        let entry = Arc::new(entry);
        self.entries.insert(entry.fingerprint.clone(), Arc::clone(&entry));
        self.store_put(entry);
    }

    /// Read-through with at most one concurrent fill per fingerprint.
    ///
    /// `compute` runs only if both tiers miss and no fill for the same
    /// fingerprint is in flight; otherwise the caller awaits that fill.
    pub async fn get_or_compute<F>(
        &self,
        fingerprint: &str,
        generation: u64,
        compute: F,
    ) -> Result<CacheOutcome, RetrievalError>
    where
        F: Future<Output = Result<Computed, RetrievalError>> + Send + 'static,
    {
        if !self.enabled {
            let computed = compute.await?;
            return Ok(CacheOutcome::Computed {
                computed,
                joined: false,
            });
        }

        if let Some((entry, tier)) = self.get(fingerprint, generation).await {
            return Ok(CacheOutcome::Hit { entry, tier });
        }

        let (fill, waiters, joined) = match self.in_flight.entry(fingerprint.to_string()) {
            Entry::Occupied(occupied) => {
                let in_flight = occupied.get();
                in_flight.waiters.fetch_add(1, Ordering::AcqRel);
                (in_flight.fill.clone(), Arc::clone(&in_flight.waiters), true)
            }
            Entry::Vacant(vacant) => {
                // A fill may have completed between the miss above and taking the shard lock.
                if let Some(entry) = self.memory_get(fingerprint, generation) {
                    return Ok(CacheOutcome::Hit {
                        entry,
                        tier: CacheTier::Memory,
                    });
                }
                let waiters = Arc::new(AtomicUsize::new(1));
                let fill = self.fill(fingerprint.to_string(), Arc::clone(&waiters), compute);
                vacant.insert(InFlight {
                    fill: fill.clone(),
                    waiters: Arc::clone(&waiters),
                });
                (fill, waiters, false)
            }
        };

        let _guard = WaiterGuard {
            in_flight: Arc::clone(&self.in_flight),
            fingerprint: fingerprint.to_string(),
            waiters,
        };
        let computed = fill.await?;
        Ok(CacheOutcome::Computed { computed, joined })
    }

    /// Drop every entry in both tiers. In-flight fills keep running; their
    /// results carry the old generation and are never served.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                events::cache_store_failure("clear", &e.to_string());
            }
        }
    }

    /// Fingerprints with a fill currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    fn fill<F>(&self, fingerprint: String, waiters: Arc<AtomicUsize>, compute: F) -> Fill
    where
        F: Future<Output = Result<Computed, RetrievalError>> + Send + 'static,
    {
        let entries = self.entries.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let store = self.store.clone();
        let cache_degraded = self.cache_degraded;

        async move {
            let result = compute.await;
            if let Ok(computed) = &result {
                if !computed.entry.is_degraded() || cache_degraded {
                    entries.insert(fingerprint.clone(), Arc::clone(&computed.entry));
                    if let Some(store) = store {
                        spawn_store_put(store, Arc::clone(&computed.entry));
                    }
                } else {
                    debug!(fingerprint = %fingerprint, "degraded result not cached");
                }
            }
            in_flight.remove_if(&fingerprint, |_, f| Arc::ptr_eq(&f.waiters, &waiters));
            result
        }
        .boxed()
        .shared()
    }

    fn memory_get(&self, fingerprint: &str, generation: u64) -> Option<Arc<CacheEntry>> {
        let entry = self.entries.get(fingerprint)?;
        if entry.generation != generation || entry.is_expired(self.ttl, Utc::now()) {
            self.entries.invalidate(fingerprint);
            return None;
        }
        Some(entry)
    }

    async fn store_get(&self, fingerprint: &str, generation: u64) -> Option<Arc<CacheEntry>> {
        let store = Arc::clone(self.store.as_ref()?);
        let key = fingerprint.to_string();
        let read = tokio::task::spawn_blocking(move || store.get(&key)).await;

        let entry = match read {
            Ok(Ok(entry)) => entry?,
            Ok(Err(e)) => {
                events::cache_store_failure("get", &e.to_string());
                return None;
            }
            Err(e) => {
                events::cache_store_failure("get", &e.to_string());
                return None;
            }
        };

        if entry.fingerprint != fingerprint {
            let error = CacheError::CorruptEntry {
                fingerprint: fingerprint.to_string(),
                reason: format!("stored under {}", entry.fingerprint),
            };
            events::cache_store_failure("get", &error.to_string());
            return None;
        }
        if entry.generation != generation || entry.is_expired(self.ttl, Utc::now()) {
            return None;
        }
        Some(Arc::new(entry))
    }

    fn store_put(&self, entry: Arc<CacheEntry>) {
        if let Some(store) = &self.store {
            spawn_store_put(Arc::clone(store), entry);
        }
    }
}

/// Detached write-through; runs to completion regardless of the caller.
fn spawn_store_put(store: Arc<dyn IResultStore>, entry: Arc<CacheEntry>) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(move || {
                if let Err(e) = store.put(&entry) {
                    events::cache_store_failure("put", &e.to_string());
                }
            });
        }
        Err(_) => {
            if let Err(e) = store.put(&entry) {
                events::cache_store_failure("put", &e.to_string());
            }
        }
    }
}
