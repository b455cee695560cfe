//! # lodestar-tokens
//!
//! Token counting via `tiktoken-rs` (`cl100k_base`), memoized per blake3
//! content hash. `TokenBudget` answers fit questions and trims text to a
//! token ceiling for the neighbor merger.

pub mod budget;
pub mod counter;

pub use budget::TokenBudget;
pub use counter::TokenCounter;
