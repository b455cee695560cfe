//! OntologyExpander: bounded, best-effort concept expansion of query terms.
//!
//! Lookups run concurrently under a single step timeout. Any dictionary
//! error or a timeout returns the original terms unchanged.

pub mod static_dictionary;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use lodestar_core::config::ExpansionConfig;
use lodestar_core::errors::{ExpansionError, LodestarResult};
use lodestar_core::models::{ExpandedTerms, RelatedConcept, TermExpansion};
use lodestar_core::traits::IConceptDictionary;
use lodestar_observability::tracing_setup::events;
use tracing::debug;

pub use static_dictionary::StaticConceptDictionary;

/// Expansion result plus the reason it fell back, if it did.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionOutcome {
    pub terms: ExpandedTerms,
    pub fallback_reason: Option<String>,
}

impl ExpansionOutcome {
    fn unchanged(original: Vec<String>) -> Self {
        Self {
            terms: ExpandedTerms::unexpanded(original),
            fallback_reason: None,
        }
    }
}

pub struct OntologyExpander {
    dictionary: Option<Arc<dyn IConceptDictionary>>,
    config: ExpansionConfig,
}

impl OntologyExpander {
    pub fn new(dictionary: Option<Arc<dyn IConceptDictionary>>, config: ExpansionConfig) -> Self {
        Self { dictionary, config }
    }

    /// Expander that never adds terms.
    pub fn disabled() -> Self {
        Self {
            dictionary: None,
            config: ExpansionConfig {
                enabled: false,
                ..ExpansionConfig::default()
            },
        }
    }

    /// Expand `terms` under the configured step timeout. Never fails.
    pub async fn expand(&self, terms: Vec<String>) -> ExpansionOutcome {
        self.expand_within(terms, Duration::from_millis(self.config.timeout_ms))
            .await
    }

    /// Like [`expand`](Self::expand), but the step timeout is also capped
    /// at `remaining`, the time left before the request deadline.
    pub async fn expand_within(&self, terms: Vec<String>, remaining: Duration) -> ExpansionOutcome {
        let dictionary = match &self.dictionary {
            Some(d) if self.config.enabled && !terms.is_empty() => Arc::clone(d),
            _ => return ExpansionOutcome::unchanged(terms),
        };

        let timeout = Duration::from_millis(self.config.timeout_ms).min(remaining);
        let lookups = tokio::time::timeout(timeout, lookup_all(dictionary.as_ref(), &terms)).await;

        let failure = match lookups {
            Ok(Ok(related)) => {
                let expanded = self.select(terms, related);
                debug!(
                    original = expanded.original.len(),
                    added = expanded.additions.len(),
                    "query terms expanded"
                );
                return ExpansionOutcome {
                    terms: expanded,
                    fallback_reason: None,
                };
            }
            Ok(Err(e)) => ExpansionError::DictionaryUnavailable {
                reason: e.to_string(),
            },
            Err(_) => ExpansionError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            },
        };

        let reason = failure.to_string();
        events::expansion_fallback(dictionary.name(), &reason);
        ExpansionOutcome {
            terms: ExpandedTerms::unexpanded(terms),
            fallback_reason: Some(reason),
        }
    }

    /// Keep the most confident additions per term, skipping anything below
    /// the confidence floor, any original term, and anything already added.
    fn select(&self, original: Vec<String>, related: Vec<Vec<RelatedConcept>>) -> ExpandedTerms {
        let mut seen: HashSet<String> = original.iter().cloned().collect();
        let mut additions = Vec::new();

        for (source, mut concepts) in original.iter().zip(related) {
            concepts.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.term.cmp(&b.term))
            });

            let mut kept = 0;
            for concept in concepts {
                if kept == self.config.max_terms_per_term {
                    break;
                }
                let term = concept.term.trim().to_lowercase();
                if term.is_empty()
                    || !concept.confidence.is_finite()
                    || concept.confidence < self.config.min_confidence
                    || !seen.insert(term.clone())
                {
                    continue;
                }
                additions.push(TermExpansion {
                    source_term: source.clone(),
                    term,
                    relation: concept.relation,
                    confidence: concept.confidence,
                });
                kept += 1;
            }
        }

        ExpandedTerms { original, additions }
    }
}

async fn lookup_all(
    dictionary: &dyn IConceptDictionary,
    terms: &[String],
) -> LodestarResult<Vec<Vec<RelatedConcept>>> {
    join_all(terms.iter().map(|t| dictionary.related(t)))
        .await
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use lodestar_core::errors::LodestarError;
    use lodestar_core::models::RelationType;

    use super::*;

    struct Fanout;

    #[async_trait]
    impl IConceptDictionary for Fanout {
        async fn related(&self, term: &str) -> LodestarResult<Vec<RelatedConcept>> {
            if term == "broken" {
                return Err(LodestarError::backend("umls", "503"));
            }
            let mut out: Vec<RelatedConcept> = (0..8)
                .map(|i| RelatedConcept {
                    term: format!("{term}-{i}"),
                    relation: RelationType::Synonym,
                    confidence: 0.9 - i as f64 * 0.1,
                })
                .collect();
            out.push(RelatedConcept {
                term: "shared".into(),
                relation: RelationType::Hypernym,
                confidence: 0.99,
            });
            out.push(RelatedConcept {
                term: term.to_uppercase(),
                relation: RelationType::Synonym,
                confidence: 0.99,
            });
            Ok(out)
        }

        fn name(&self) -> &str {
            "fanout"
        }
    }

    fn expander(config: ExpansionConfig) -> OntologyExpander {
        OntologyExpander::new(Some(Arc::new(Fanout)), config)
    }

    #[tokio::test]
    async fn additions_are_bounded_filtered_and_deduplicated() {
        let outcome = expander(ExpansionConfig::default())
            .expand(vec!["alpha".into(), "beta".into()])
            .await;
        let terms = outcome.terms;

        assert_eq!(terms.original, vec!["alpha", "beta"]);
        for source in ["alpha", "beta"] {
            assert!(terms.additions_for(source).count() <= 5);
            assert!(terms.additions_for(source).all(|a| a.confidence >= 0.5));
        }
        // "shared" is kept once; each term's own upper-case form is dropped.
        assert_eq!(terms.additions.iter().filter(|a| a.term == "shared").count(), 1);
        assert!(!terms.additions.iter().any(|a| a.term == "alpha" || a.term == "beta"));
        assert!(outcome.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn dictionary_error_returns_original_terms() {
        let outcome = expander(ExpansionConfig::default())
            .expand(vec!["alpha".into(), "broken".into()])
            .await;
        assert_eq!(outcome.terms, ExpandedTerms::unexpanded(vec!["alpha".into(), "broken".into()]));
        assert!(outcome.fallback_reason.unwrap().contains("503"));
    }

    struct Stalled;

    #[async_trait]
    impl IConceptDictionary for Stalled {
        async fn related(&self, _term: &str) -> LodestarResult<Vec<RelatedConcept>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_time_caps_the_step_timeout() {
        let config = ExpansionConfig {
            timeout_ms: 5_000,
            ..ExpansionConfig::default()
        };
        let expander = OntologyExpander::new(Some(Arc::new(Stalled)), config);

        let started = tokio::time::Instant::now();
        let outcome = expander
            .expand_within(vec!["mi".into()], Duration::from_millis(40))
            .await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!outcome.terms.is_expanded());
        assert!(outcome.fallback_reason.unwrap().contains("40ms"));
    }

    #[tokio::test]
    async fn disabled_expander_adds_nothing() {
        let outcome = OntologyExpander::disabled().expand(vec!["mi".into()]).await;
        assert!(!outcome.terms.is_expanded());
        assert!(outcome.fallback_reason.is_none());
    }
}
