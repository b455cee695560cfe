// Single source of truth for all default values.

// --- Retrieval / orchestration ---
pub const DEFAULT_TOP_K: usize = 50;
pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_RETRIEVER_TIMEOUT_MS: u64 = 800;
pub const DEFAULT_REQUEST_DEADLINE_MS: u64 = 2_000;

// --- Fusion ---
pub const DEFAULT_RRF_K: u32 = 60;

// --- Neighbor merge ---
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.60;
pub const DEFAULT_MAX_MERGED_TOKENS: usize = 1_200;

// --- Result cache ---
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
pub const DEFAULT_CACHE_DEGRADED: bool = false;

// --- Intent ---
pub const DEFAULT_INTENT_CONFIDENCE_FLOOR: f64 = 0.55;

// --- Expansion ---
pub const DEFAULT_EXPANSION_ENABLED: bool = true;
pub const DEFAULT_MAX_TERMS_PER_TERM: usize = 5;
pub const DEFAULT_EXPANSION_TIMEOUT_MS: u64 = 150;
pub const DEFAULT_EXPANSION_MIN_CONFIDENCE: f64 = 0.5;

// --- Tokens ---
pub const DEFAULT_TOKEN_CACHE_CAPACITY: u64 = 10_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;
