//! IntentEngine: resolve a request's intent and serve its fusion weights.

pub mod classifier;
pub mod weight_matrix;

use std::sync::Arc;

use lodestar_core::constants::OVERRIDE_CONFIDENCE;
use lodestar_core::intent::Intent;
use lodestar_core::models::{IntentSource, RetrieverTag};
use lodestar_core::traits::IIntentEmbedder;

pub use classifier::{IntentClassification, IntentClassifier};
pub use weight_matrix::{WeightMatrix, WeightProfile};

/// Intent classification and weight lookup.
pub struct IntentEngine {
    classifier: IntentClassifier,
    matrix: Arc<WeightMatrix>,
}

impl IntentEngine {
    pub fn new(confidence_floor: f64, matrix: WeightMatrix) -> Self {
        Self {
            classifier: IntentClassifier::new(confidence_floor),
            matrix: Arc::new(matrix),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn IIntentEmbedder>) -> Self {
        self.classifier = self.classifier.with_embedder(embedder);
        self
    }

    /// Classify query text.
    pub fn classify(&self, text: &str) -> IntentClassification {
        self.classifier.classify(text)
    }

    /// A caller override skips classification entirely.
    pub fn resolve(&self, text: &str, intent_override: Option<Intent>) -> IntentClassification {
        match intent_override {
            Some(intent) => IntentClassification {
                intent,
                confidence: OVERRIDE_CONFIDENCE,
                source: IntentSource::Override,
                fallback_reason: None,
            },
            None => self.classify(text),
        }
    }

    pub fn weight(&self, intent: Intent, retriever: RetrieverTag) -> f64 {
        self.matrix.weight(intent, retriever)
    }

    pub fn matrix(&self) -> &Arc<WeightMatrix> {
        &self.matrix
    }
}

impl Default for IntentEngine {
    fn default() -> Self {
        Self::new(
            lodestar_core::config::defaults::DEFAULT_INTENT_CONFIDENCE_FLOOR,
            WeightMatrix::default_weights(),
        )
    }
}
