//! # lodestar-core
//!
//! Foundation crate for the Lodestar hybrid retrieval core.
//! Defines the query/candidate/result models, the intent taxonomy,
//! the collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod intent;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::LodestarConfig;
pub use errors::{LodestarError, LodestarResult};
pub use intent::Intent;
pub use models::{
    Candidate, ChunkKind, ChunkMetadata, FusedResult, MergedResult, Query, QueryFilters,
    RetrievalRequest, RetrievalResponse, RetrieverTag,
};
