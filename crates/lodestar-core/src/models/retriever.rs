use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Which independent signal produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverTag {
    /// BM25-style term matching.
    Lexical,
    /// Learned sparse term weights.
    Sparse,
    /// Dense vector similarity.
    Dense,
    /// Knowledge-graph neighbor lookup.
    Graph,
}

impl RetrieverTag {
    pub const COUNT: usize = 4;

    /// Fixed iteration order. Fusion sums partial scores in this order so
    /// combined scores are bit-for-bit reproducible.
    pub const ALL: [RetrieverTag; 4] = [Self::Lexical, Self::Sparse, Self::Dense, Self::Graph];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Sparse => "sparse",
            Self::Dense => "dense",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for RetrieverTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrieverTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ConfigError::UnknownRetriever {
                name: s.to_string(),
            })
    }
}
