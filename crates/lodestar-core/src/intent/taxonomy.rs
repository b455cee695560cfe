use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The clinical purpose of a query. Drives weight-profile selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Population / intervention / comparator / outcome framing.
    Pico,
    /// Trial endpoints and efficacy outcomes (mortality, survival, ...).
    Endpoint,
    AdverseEvent,
    Dose,
    Eligibility,
    #[default]
    General,
}

impl Intent {
    /// Total number of intent types.
    pub const COUNT: usize = 6;

    /// All variants for iteration.
    pub const ALL: [Intent; 6] = [
        Self::Pico,
        Self::Endpoint,
        Self::AdverseEvent,
        Self::Dose,
        Self::Eligibility,
        Self::General,
    ];

    /// Stable snake_case name, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pico => "pico",
            Self::Endpoint => "endpoint",
            Self::AdverseEvent => "adverse_event",
            Self::Dose => "dose",
            Self::Eligibility => "eligibility",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ConfigError::UnknownIntent {
                name: s.to_string(),
            })
    }
}
