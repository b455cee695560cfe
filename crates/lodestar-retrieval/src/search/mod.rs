//! Signal fan-out and rank fusion.

pub mod fan_out;
pub mod rrf_fusion;

pub use fan_out::{FanOutResult, SignalFanOut, SignalOutcome};
pub use rrf_fusion::FusionEngine;
