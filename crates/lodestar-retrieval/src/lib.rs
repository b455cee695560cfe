//! # lodestar-retrieval
//!
//! The hybrid retrieval fusion core. One request: classify intent, expand
//! terms, fan out to four independent signals, fuse their rankings with
//! intent-weighted RRF, fold adjacent similar chunks, memoize the result.
//!
//! ## Architecture
//!
//! ```text
//! RetrievalOrchestrator
//! ├── IntentEngine
//! │   ├── IntentClassifier (cue rules → exemplar similarity → general)
//! │   └── WeightMatrix (intent → retriever weights, versioned)
//! ├── OntologyExpander
//! │   └── StaticConceptDictionary (built-in clinical table)
//! ├── SignalFanOut (JoinSet, per-signal timeout, request deadline)
//! ├── FusionEngine (weighted RRF, weight redistribution)
//! ├── NeighborMerger (adjacency + similarity + token budget)
//! ├── ResultCache
//! │   ├── moka L1 + optional IResultStore
//! │   ├── single-flight fills
//! │   └── IndexGeneration
//! └── StateTrace (pipeline state machine)
//! ```

pub mod cache;
pub mod expansion;
pub mod intent;
pub mod merge;
pub mod orchestrator;
pub mod search;

pub use cache::ResultCache;
pub use expansion::{OntologyExpander, StaticConceptDictionary};
pub use intent::{IntentEngine, WeightMatrix};
pub use merge::NeighborMerger;
pub use orchestrator::{OrchestratorBuilder, RetrievalOrchestrator};
pub use search::{FusionEngine, SignalFanOut};
