mod cache_error;
mod classification_error;
mod config_error;
mod expansion_error;
mod lodestar_error;
mod retrieval_error;

pub use cache_error::CacheError;
pub use classification_error::ClassificationError;
pub use config_error::ConfigError;
pub use expansion_error::ExpansionError;
pub use lodestar_error::{LodestarError, LodestarResult};
pub use retrieval_error::RetrievalError;
