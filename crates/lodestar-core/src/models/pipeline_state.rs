use std::fmt;

use serde::{Deserialize, Serialize};

/// Request lifecycle states of the retrieval orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Expanding,
    FanningOut,
    Fusing,
    Merging,
    Caching,
    Completed,
    Error,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Expanding => "expanding",
            Self::FanningOut => "fanning_out",
            Self::Fusing => "fusing",
            Self::Merging => "merging",
            Self::Caching => "caching",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Legal edges: the forward chain, `error` from any live state, and
    /// the cache-hit shortcut from `expanding` straight to `completed`.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        if self.is_terminal() {
            return false;
        }
        if next == Error {
            return true;
        }
        matches!(
            (self, next),
            (Received, Expanding)
                | (Expanding, FanningOut)
                | (Expanding, Completed)
                | (FanningOut, Fusing)
                | (Fusing, Merging)
                | (Merging, Caching)
                | (Caching, Completed)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
