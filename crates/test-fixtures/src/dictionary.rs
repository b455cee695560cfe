//! Concept dictionary doubles.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use lodestar_core::errors::{LodestarError, LodestarResult};
use lodestar_core::models::{RelatedConcept, RelationType};
use lodestar_core::traits::IConceptDictionary;

/// In-memory dictionary.
#[derive(Debug, Clone, Default)]
pub struct MapDictionary {
    entries: HashMap<String, Vec<RelatedConcept>>,
}

impl MapDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, term: &str, related: &str, relation: RelationType, confidence: f64) -> Self {
        self.entries
            .entry(term.to_string())
            .or_default()
            .push(RelatedConcept {
                term: related.to_string(),
                relation,
                confidence,
            });
        self
    }
}

#[async_trait]
impl IConceptDictionary for MapDictionary {
    async fn related(&self, term: &str) -> LodestarResult<Vec<RelatedConcept>> {
        Ok(self.entries.get(term).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "map"
    }
}

/// Every lookup errors.
#[derive(Debug, Clone, Default)]
pub struct FailingDictionary;

#[async_trait]
impl IConceptDictionary for FailingDictionary {
    async fn related(&self, _term: &str) -> LodestarResult<Vec<RelatedConcept>> {
        Err(LodestarError::backend("ontology", "connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Wraps a dictionary and delays every lookup.
#[derive(Debug, Clone)]
pub struct SlowDictionary {
    inner: MapDictionary,
    delay: Duration,
}

impl SlowDictionary {
    pub fn new(inner: MapDictionary, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl IConceptDictionary for SlowDictionary {
    async fn related(&self, term: &str) -> LodestarResult<Vec<RelatedConcept>> {
        tokio::time::sleep(self.delay).await;
        self.inner.related(term).await
    }

    fn name(&self) -> &str {
        "slow"
    }
}
