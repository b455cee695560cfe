mod cache_entry;
mod candidate;
mod degradation_event;
mod expansion;
mod fused_result;
mod merged_result;
mod pipeline_state;
mod query;
mod response;
mod retriever;

pub use cache_entry::CacheEntry;
pub use candidate::{Candidate, ChunkKind, ChunkMetadata};
pub use degradation_event::DegradationEvent;
pub use expansion::{ExpandedQuery, ExpandedTerms, RelatedConcept, RelationType, TermExpansion};
pub use fused_result::{Contribution, FusedResult};
pub use merged_result::{Constituent, MergedResult};
pub use pipeline_state::PipelineState;
pub use query::{DateRange, LicenseTier, Query, QueryFilters, RetrievalRequest};
pub use response::{IntentSource, RetrievalResponse};
pub use retriever::RetrieverTag;
