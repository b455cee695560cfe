use serde::{Deserialize, Serialize};

use super::defaults;

/// Ontology expansion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub enabled: bool,
    /// Additions kept per original term.
    pub max_terms_per_term: usize,
    /// Budget for the whole expansion step.
    pub timeout_ms: u64,
    /// Dictionary entries below this confidence are ignored.
    pub min_confidence: f64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_EXPANSION_ENABLED,
            max_terms_per_term: defaults::DEFAULT_MAX_TERMS_PER_TERM,
            timeout_ms: defaults::DEFAULT_EXPANSION_TIMEOUT_MS,
            min_confidence: defaults::DEFAULT_EXPANSION_MIN_CONFIDENCE,
        }
    }
}
