//! Result store doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lodestar_core::errors::{CacheError, LodestarResult};
use lodestar_core::models::CacheEntry;
use lodestar_core::traits::IResultStore;

/// In-memory store with read/write counters.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> CacheError {
        CacheError::StoreUnavailable {
            reason: "lock poisoned".to_string(),
        }
    }
}

impl IResultStore for MemoryResultStore {
    fn get(&self, fingerprint: &str) -> LodestarResult<Option<CacheEntry>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.get(fingerprint).cloned())
    }

    fn put(&self, entry: &CacheEntry) -> LodestarResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        entries.insert(entry.fingerprint.clone(), entry.clone());
        Ok(())
    }

    fn clear(&self) -> LodestarResult<()> {
        self.entries.lock().map_err(|_| Self::poisoned())?.clear();
        Ok(())
    }
}

/// Every operation fails.
#[derive(Debug, Default)]
pub struct FailingResultStore {
    attempts: AtomicUsize,
}

impl FailingResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        CacheError::StoreUnavailable {
            reason: "disk full".to_string(),
        }
    }
}

impl IResultStore for FailingResultStore {
    fn get(&self, _fingerprint: &str) -> LodestarResult<Option<CacheEntry>> {
        Err(self.fail().into())
    }

    fn put(&self, _entry: &CacheEntry) -> LodestarResult<()> {
        Err(self.fail().into())
    }

    fn clear(&self) -> LodestarResult<()> {
        Err(self.fail().into())
    }
}
