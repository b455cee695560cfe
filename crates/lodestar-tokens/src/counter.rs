use std::sync::Arc;

use lodestar_core::errors::{LodestarError, LodestarResult};
use moka::sync::Cache;
use tiktoken_rs::CoreBPE;

/// Token counter wrapping tiktoken's cl100k_base tokenizer.
/// Caches counts per blake3 content hash.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
    cache: Cache<String, usize>,
}

impl TokenCounter {
    /// Load the tokenizer and size the count cache.
    pub fn new(cache_capacity: u64) -> LodestarResult<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| LodestarError::backend("tiktoken", e.to_string()))?;
        Ok(Self {
            bpe: Arc::new(bpe),
            cache: Cache::new(cache_capacity),
        })
    }

    /// Count tokens in the given text (uncached).
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Count tokens with blake3 content-hash caching.
    pub fn count_cached(&self, text: &str) -> usize {
        let hash = blake3::hash(text.as_bytes()).to_hex().to_string();
        self.cache.get_with(hash, || self.count(text))
    }

    /// Longest token-boundary prefix of `text` holding at most `max_tokens` tokens.
    ///
    /// Backs off one token at a time when a cut lands inside a multi-byte
    /// character and the prefix does not decode.
    pub fn truncate(&self, text: &str, max_tokens: usize) -> String {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= max_tokens {
            return text.to_string();
        }

        let mut end = max_tokens;
        while end > 0 {
            if let Ok(prefix) = self.bpe.decode(tokens[..end].to_vec()) {
                return prefix;
            }
            end -= 1;
        }
        String::new()
    }
}
