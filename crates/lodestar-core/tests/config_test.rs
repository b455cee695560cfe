use lodestar_core::config::*;
use lodestar_core::errors::{ConfigError, LodestarError};

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = LodestarConfig::from_toml("").unwrap();

    // Retrieval defaults
    assert_eq!(config.retrieval.top_k, 50);
    assert_eq!(config.retrieval.max_results, 20);
    assert_eq!(config.retrieval.retriever_timeout_ms, 800);
    assert_eq!(config.retrieval.request_deadline_ms, 2_000);

    // Fusion defaults
    assert_eq!(config.fusion.rrf_k, 60);
    assert!(config.fusion.weights.is_empty());

    // Merge defaults
    assert_eq!(config.merge.similarity_threshold, 0.60);
    assert_eq!(config.merge.max_merged_tokens, 1_200);

    // Cache defaults
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 300);
    assert!(!config.cache.cache_degraded);

    // Intent / expansion defaults
    assert_eq!(config.intent.confidence_floor, 0.55);
    assert_eq!(config.expansion.max_terms_per_term, 5);
    assert_eq!(config.expansion.timeout_ms, 150);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[fusion]
rrf_k = 20

[fusion.weights.adverse_event]
lexical = 0.5
graph = 0.5

[merge]
similarity_threshold = 0.7
"#;
    let config = LodestarConfig::from_toml(toml).unwrap();
    assert_eq!(config.fusion.rrf_k, 20);
    assert_eq!(config.fusion.weights["adverse_event"]["lexical"], 0.5);
    assert_eq!(config.merge.similarity_threshold, 0.7);
    // Non-overridden fields keep defaults
    assert_eq!(config.merge.max_merged_tokens, 1_200);
    assert_eq!(config.retrieval.top_k, 50);
}

#[test]
fn config_rejects_out_of_range_threshold() {
    let err = LodestarConfig::from_toml("[merge]\nsimilarity_threshold = 1.5\n").unwrap_err();
    assert!(matches!(
        err,
        LodestarError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "merge.similarity_threshold"
    ));
}

#[test]
fn config_rejects_zero_rrf_k() {
    let err = LodestarConfig::from_toml("[fusion]\nrrf_k = 0\n").unwrap_err();
    assert!(matches!(err, LodestarError::Config(ConfigError::InvalidValue { .. })));
}

#[test]
fn config_rejects_unknown_retriever_in_weights() {
    let toml = "[fusion.weights.dose]\nkeyword = 0.3\n";
    let err = LodestarConfig::from_toml(toml).unwrap_err();
    assert!(matches!(
        err,
        LodestarError::Config(ConfigError::UnknownRetriever { .. })
    ));
}

#[test]
fn config_reports_parse_errors() {
    let err = LodestarConfig::from_toml("[fusion\nrrf_k = ").unwrap_err();
    assert!(matches!(err, LodestarError::Config(ConfigError::Parse { .. })));
}

#[test]
fn config_serde_roundtrip() {
    let config = LodestarConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = LodestarConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.fusion.rrf_k, config.fusion.rrf_k);
    assert_eq!(roundtripped.cache.ttl_secs, config.cache.ttl_secs);
}
