mod concept_dictionary;
mod intent_embedder;
mod result_store;
mod retriever;
mod similarity;

pub use concept_dictionary::IConceptDictionary;
pub use intent_embedder::IIntentEmbedder;
pub use result_store::IResultStore;
pub use retriever::ISignalRetriever;
pub use similarity::ISimilaritySource;
