//! Intent → retriever fusion weights.
//!
//! Default profiles come from `lodestar_core::intent::weights`; TOML
//! overrides replace individual entries and the touched profiles are
//! renormalized to `WEIGHT_PROFILE_TOTAL`. Immutable after construction.

use std::collections::HashMap;

use lodestar_core::config::FusionConfig;
use lodestar_core::constants::{WEIGHT_PROFILE_TOTAL, WEIGHT_SUM_EPSILON};
use lodestar_core::errors::ConfigError;
use lodestar_core::intent::weights::{default_weight, parse_weight_overrides};
use lodestar_core::intent::Intent;
use lodestar_core::models::RetrieverTag;

/// One intent's weights, indexed in `RetrieverTag::ALL` order.
pub type WeightProfile = [f64; RetrieverTag::COUNT];

/// Weight matrix: Intent → (RetrieverTag → weight).
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    profiles: HashMap<Intent, WeightProfile>,
    version: String,
}

pub(crate) fn slot(retriever: RetrieverTag) -> usize {
    match retriever {
        RetrieverTag::Lexical => 0,
        RetrieverTag::Sparse => 1,
        RetrieverTag::Dense => 2,
        RetrieverTag::Graph => 3,
    }
}

impl WeightMatrix {
    /// Create with hardcoded default weights.
    pub fn default_weights() -> Self {
        let profiles = Intent::ALL
            .iter()
            .map(|&intent| {
                let mut profile = [0.0; RetrieverTag::COUNT];
                for r in RetrieverTag::ALL {
                    profile[slot(r)] = default_weight(intent, r);
                }
                (intent, profile)
            })
            .collect();
        Self::with_profiles(profiles)
    }

    /// Defaults with the `[fusion.weights]` overrides applied.
    pub fn from_config(config: &FusionConfig) -> Result<Self, ConfigError> {
        let overrides = parse_weight_overrides(&config.weights)?;
        if overrides.is_empty() {
            return Ok(Self::default_weights());
        }

        let mut profiles = Self::default_weights().profiles;
        for ((intent, retriever), weight) in &overrides {
            if let Some(profile) = profiles.get_mut(intent) {
                profile[slot(*retriever)] = *weight;
            }
        }

        for intent in Intent::ALL {
            let touched = overrides.keys().any(|(i, _)| *i == intent);
            let Some(profile) = profiles.get_mut(&intent) else {
                continue;
            };
            if !touched {
                continue;
            }
            let sum: f64 = profile.iter().sum();
            if sum <= WEIGHT_SUM_EPSILON {
                return Err(ConfigError::InvalidWeightProfile {
                    intent: intent.to_string(),
                    reason: "weights sum to zero".to_string(),
                });
            }
            for w in profile.iter_mut() {
                *w = *w * WEIGHT_PROFILE_TOTAL / sum;
            }
        }

        Ok(Self::with_profiles(profiles))
    }

    fn with_profiles(profiles: HashMap<Intent, WeightProfile>) -> Self {
        let version = Self::compute_version(&profiles);
        Self { profiles, version }
    }

    /// blake3 over the canonical table: intents and retrievers in their
    /// `ALL` order, weights as exact bit patterns.
    fn compute_version(profiles: &HashMap<Intent, WeightProfile>) -> String {
        let mut hasher = blake3::Hasher::new();
        for intent in Intent::ALL {
            hasher.update(intent.as_str().as_bytes());
            let profile = profiles.get(&intent).copied().unwrap_or_default();
            for r in RetrieverTag::ALL {
                hasher.update(r.as_str().as_bytes());
                hasher.update(&profile[slot(r)].to_bits().to_le_bytes());
            }
        }
        hasher.finalize().to_hex()[..16].to_string()
    }

    /// Get the configured weight for a retriever under an intent.
    pub fn weight(&self, intent: Intent, retriever: RetrieverTag) -> f64 {
        self.profile(intent)[slot(retriever)]
    }

    pub fn profile(&self, intent: Intent) -> WeightProfile {
        self.profiles.get(&intent).copied().unwrap_or_default()
    }

    /// Stable identifier of the table contents; part of every cache fingerprint.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The intent's profile with the weight of every non-contributing
    /// retriever redistributed proportionally onto the contributing ones.
    ///
    /// Contributing weights sum to `WEIGHT_PROFILE_TOTAL` whenever at least
    /// one retriever contributed. If all contributing retrievers carry zero
    /// weight, the total is split equally among them.
    pub fn effective_profile(&self, intent: Intent, contributing: &[RetrieverTag]) -> WeightProfile {
        let base = self.profile(intent);
        let mut effective = [0.0; RetrieverTag::COUNT];
        if contributing.is_empty() {
            return effective;
        }

        let surviving: f64 = contributing.iter().map(|&r| base[slot(r)]).sum();
        for &r in contributing {
            effective[slot(r)] = if surviving > WEIGHT_SUM_EPSILON {
                base[slot(r)] * WEIGHT_PROFILE_TOTAL / surviving
            } else {
                WEIGHT_PROFILE_TOTAL / contributing.len() as f64
            };
        }
        effective
    }
}

impl Default for WeightMatrix {
    fn default() -> Self {
        Self::default_weights()
    }
}
