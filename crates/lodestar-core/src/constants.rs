/// Lodestar system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of independent signal retrievers (lexical, sparse, dense, graph).
pub const RETRIEVER_COUNT: usize = 4;

/// Every weight profile sums to this total, so combined scores stay
/// comparable across intents and requests.
pub const WEIGHT_PROFILE_TOTAL: f64 = 1.0;

/// Tolerance used when checking that a profile sums to the total.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// Confidence reported when nothing classifies a query and it lands on `general`.
pub const DEFAULT_GENERAL_CONFIDENCE: f64 = 0.5;

/// Confidence reported for a caller-supplied intent override.
pub const OVERRIDE_CONFIDENCE: f64 = 1.0;

/// Terms dropped before ontology lookups.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how",
    "in", "is", "it", "of", "on", "or", "should", "the", "to", "what", "when", "which", "who",
    "with",
];
