use async_trait::async_trait;

use crate::errors::LodestarResult;
use crate::models::RelatedConcept;

/// Narrow lookup interface onto a concept/ontology dictionary.
#[async_trait]
pub trait IConceptDictionary: Send + Sync {
    /// Related terms for a single query term. An unknown term yields an empty list.
    async fn related(&self, term: &str) -> LodestarResult<Vec<RelatedConcept>>;

    /// Human-readable dictionary name.
    fn name(&self) -> &str;
}
