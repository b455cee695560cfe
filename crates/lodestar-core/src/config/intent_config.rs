use serde::{Deserialize, Serialize};

use super::defaults;

/// Intent classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Minimum exemplar similarity for the embedding fallback to pick an intent.
    pub confidence_floor: f64,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            confidence_floor: defaults::DEFAULT_INTENT_CONFIDENCE_FLOOR,
        }
    }
}
