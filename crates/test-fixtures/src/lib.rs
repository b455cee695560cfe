//! Test doubles and golden-scenario loading for the Lodestar workspace.
//!
//! Doubles count their calls so tests can assert that cached requests
//! never reach a retriever, and inject latency and failures.

pub mod builders;
pub mod dictionary;
pub mod retriever;
pub mod similarity;
pub mod store;

use std::path::PathBuf;

use serde::de::DeserializeOwned;

pub use builders::{candidates, chunk, ChunkBuilder};
pub use dictionary::{FailingDictionary, MapDictionary, SlowDictionary};
pub use retriever::ScriptedRetriever;
pub use similarity::MapSimilarity;
pub use store::{FailingResultStore, MemoryResultStore};

/// Root directory of the golden scenario files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// List all JSON files in the golden directory, sorted by name.
pub fn list_fixtures() -> Vec<PathBuf> {
    let dir = fixtures_root();
    let Ok(read) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    paths.sort();
    paths
}
