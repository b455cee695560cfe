//! Map-backed similarity source.

use std::collections::HashMap;

use lodestar_core::errors::{LodestarError, LodestarResult};
use lodestar_core::traits::ISimilaritySource;

/// Symmetric pairwise similarities; unknown pairs score `default`.
#[derive(Debug, Clone, Default)]
pub struct MapSimilarity {
    pairs: HashMap<(String, String), f64>,
    default: f64,
    failing: bool,
}

impl MapSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(mut self, a: &str, b: &str, similarity: f64) -> Self {
        self.pairs.insert(Self::key(a, b), similarity);
        self
    }

    pub fn with_default(mut self, similarity: f64) -> Self {
        self.default = similarity;
        self
    }

    /// Every lookup errors.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}

impl ISimilaritySource for MapSimilarity {
    fn similarity(&self, a: &str, b: &str) -> LodestarResult<f64> {
        if self.failing {
            return Err(LodestarError::backend("similarity", "provider offline"));
        }
        Ok(self.pairs.get(&Self::key(a, b)).copied().unwrap_or(self.default))
    }
}
