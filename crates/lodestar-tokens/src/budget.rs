use super::counter::TokenCounter;

/// Token budget checks against a fixed ceiling.
pub struct TokenBudget<'a> {
    counter: &'a TokenCounter,
    max_tokens: usize,
}

impl<'a> TokenBudget<'a> {
    pub fn new(counter: &'a TokenCounter, max_tokens: usize) -> Self {
        Self {
            counter,
            max_tokens,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// How many tokens remain after using `used`.
    pub fn remaining(&self, used: usize) -> usize {
        self.max_tokens.saturating_sub(used)
    }

    /// Whether `used + additional` stays within the ceiling.
    pub fn admits(&self, used: usize, additional: usize) -> bool {
        used.saturating_add(additional) <= self.max_tokens
    }

    /// Whether the given text fits within the ceiling.
    pub fn fits(&self, text: &str) -> bool {
        self.counter.count_cached(text) <= self.max_tokens
    }

    /// Trim `text` until its recounted length is within the ceiling.
    /// Returns the trimmed text and its token count.
    pub fn truncate_to_fit(&self, text: &str) -> (String, usize) {
        let mut target = self.max_tokens;
        let mut trimmed = self.counter.truncate(text, target);
        let mut count = self.counter.count(&trimmed);

        // Re-encoding a decoded prefix can occasionally tokenize differently.
        while count > self.max_tokens && target > 0 {
            target -= 1;
            trimmed = self.counter.truncate(text, target);
            count = self.counter.count(&trimmed);
        }
        (trimmed, count)
    }
}
