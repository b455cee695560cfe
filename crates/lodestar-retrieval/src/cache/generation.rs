//! Index generation epoch.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic epoch of the underlying indices. Results computed under one
/// generation are never served under another.
#[derive(Debug, Default)]
pub struct IndexGeneration(AtomicU64);

impl IndexGeneration {
    pub fn new(initial: u64) -> Self {
        Self(AtomicU64::new(initial))
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Advance the epoch. Returns (previous, current).
    pub fn bump(&self) -> (u64, u64) {
        let previous = self.0.fetch_add(1, Ordering::AcqRel);
        (previous, previous.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_advances_by_one() {
        let generation = IndexGeneration::new(7);
        assert_eq!(generation.bump(), (7, 8));
        assert_eq!(generation.current(), 8);
    }
}
