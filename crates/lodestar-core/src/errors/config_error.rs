/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown intent: {name}")]
    UnknownIntent { name: String },

    #[error("unknown retriever: {name}")]
    UnknownRetriever { name: String },

    #[error("invalid weight profile for {intent}: {reason}")]
    InvalidWeightProfile { intent: String, reason: String },
}
