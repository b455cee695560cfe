//! Intent classification: ordered cue rules first, exemplar-embedding
//! similarity second, `general` last.

use std::sync::Arc;

use lodestar_core::constants::DEFAULT_GENERAL_CONFIDENCE;
use lodestar_core::errors::{ClassificationError, LodestarResult};
use lodestar_core::intent::Intent;
use lodestar_core::models::IntentSource;
use lodestar_core::traits::IIntentEmbedder;
use lodestar_observability::tracing_setup::events;
use regex::Regex;

/// Cue phrases per intent, in rule order. A cue matches a whole word or
/// phrase, optionally pluralized. A trailing `*` marks a stem that matches
/// any word starting with it.
const INTENT_CUES: &[(Intent, &[&str])] = &[
    (
        Intent::AdverseEvent,
        &[
            "adverse event",
            "adverse reaction",
            "side effect",
            "toxicit*",
            "safety signal",
            "harms",
            "contraindicat*",
        ],
    ),
    (
        Intent::Dose,
        &["dose", "dosing", "dosage", "mg/kg", "titration", "regimen"],
    ),
    (
        Intent::Eligibility,
        &[
            "eligib*",
            "inclusion criteria",
            "exclusion criteria",
            "enrollment criteria",
        ],
    ),
    (
        Intent::Endpoint,
        &[
            "mortality",
            "survival",
            "endpoint",
            "outcome measure",
            "primary outcome",
            "hazard ratio",
            "efficacy",
            "reduce",
        ],
    ),
    (
        Intent::Pico,
        &[
            "population",
            "intervention",
            "comparator",
            "compared with",
            "in patients with",
            "versus",
            "vs",
        ],
    ),
];

/// One short exemplar per intent for the embedding fallback.
const INTENT_EXEMPLARS: &[(Intent, &str)] = &[
    (Intent::Pico, "in adults with heart failure does the treatment compared with placebo improve outcomes"),
    (Intent::Endpoint, "effect of the drug on all-cause death and hospitalization rates"),
    (Intent::AdverseEvent, "serious harms and unwanted reactions reported with the drug"),
    (Intent::Dose, "how many milligrams per day should be given and how often"),
    (Intent::Eligibility, "which patients can enroll in the trial and who is excluded"),
];

const RULE_BASE_CONFIDENCE: f64 = 0.6;
const RULE_CONFIDENCE_STEP: f64 = 0.1;
const RULE_CONFIDENCE_CAP: f64 = 0.95;

/// Outcome of classifying one query.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentClassification {
    pub intent: Intent,
    pub confidence: f64,
    pub source: IntentSource,
    /// Why the embedding fallback could not be used, if it was needed and failed.
    pub fallback_reason: Option<String>,
}

impl IntentClassification {
    fn general() -> Self {
        Self {
            intent: Intent::General,
            confidence: DEFAULT_GENERAL_CONFIDENCE,
            source: IntentSource::Fallback,
            fallback_reason: None,
        }
    }
}

struct ExemplarIndex {
    embedder: Arc<dyn IIntentEmbedder>,
    /// `None` until the exemplars embed successfully.
    exemplars: Option<Vec<(Intent, Vec<f32>)>>,
}

/// Deterministic intent classifier.
pub struct IntentClassifier {
    rules: Vec<(Intent, Vec<Regex>)>,
    exemplars: Option<ExemplarIndex>,
    confidence_floor: f64,
}

impl IntentClassifier {
    /// Rule-only classifier.
    pub fn new(confidence_floor: f64) -> Self {
        let rules = INTENT_CUES
            .iter()
            .map(|(intent, cues)| {
                let patterns = cues.iter().filter_map(|cue| cue_pattern(cue).ok()).collect();
                (*intent, patterns)
            })
            .collect();
        Self {
            rules,
            exemplars: None,
            confidence_floor,
        }
    }

    /// Enable the exemplar-similarity fallback.
    ///
    /// Exemplars are embedded eagerly; if that fails the classifier stays
    /// rule-only and retries on the next query that needs the fallback.
    pub fn with_embedder(mut self, embedder: Arc<dyn IIntentEmbedder>) -> Self {
        let exemplars = embed_exemplars(embedder.as_ref()).ok();
        self.exemplars = Some(ExemplarIndex { embedder, exemplars });
        self
    }

    /// Classify a query. Same input, same output; never fails.
    pub fn classify(&self, text: &str) -> IntentClassification {
        if let Some(classification) = self.classify_by_rules(text) {
            return classification;
        }

        match self.classify_by_exemplars(text) {
            Ok(Some(classification)) => classification,
            Ok(None) => IntentClassification::general(),
            Err(reason) => {
                let embedder = self
                    .exemplars
                    .as_ref()
                    .map(|e| e.embedder.name().to_string())
                    .unwrap_or_default();
                events::classifier_fallback(&embedder, &reason);
                IntentClassification {
                    fallback_reason: Some(reason),
                    ..IntentClassification::general()
                }
            }
        }
    }

    /// Most cue hits wins; a tie between intents resolves to `general`.
    fn classify_by_rules(&self, text: &str) -> Option<IntentClassification> {
        let mut best: Option<(Intent, usize)> = None;
        let mut tied = false;

        for (intent, patterns) in &self.rules {
            let hits = patterns.iter().filter(|p| p.is_match(text)).count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits < top => {}
                Some((_, top)) if hits == top => tied = true,
                _ => {
                    best = Some((*intent, hits));
                    tied = false;
                }
            }
        }

        let (intent, hits) = best?;
        let confidence =
            (RULE_BASE_CONFIDENCE + RULE_CONFIDENCE_STEP * hits as f64).min(RULE_CONFIDENCE_CAP);
        Some(IntentClassification {
            intent: if tied { Intent::General } else { intent },
            confidence,
            source: IntentSource::Rule,
            fallback_reason: None,
        })
    }

    /// `Ok(None)` when no embedder is configured or nothing clears the floor.
    fn classify_by_exemplars(&self, text: &str) -> Result<Option<IntentClassification>, String> {
        let Some(index) = &self.exemplars else {
            return Ok(None);
        };
        if !index.embedder.is_available() {
            return Err(format!("{} unavailable", index.embedder.name()));
        }

        let retried;
        let exemplars = match &index.exemplars {
            Some(exemplars) => exemplars,
            None => {
                retried = embed_exemplars(index.embedder.as_ref()).map_err(|e| e.to_string())?;
                &retried
            }
        };

        let query = index.embedder.embed(text).map_err(|e| e.to_string())?;

        let mut best: Option<(Intent, f64)> = None;
        for (intent, exemplar) in exemplars {
            if exemplar.len() != query.len() {
                return Err(ClassificationError::DimensionMismatch {
                    expected: exemplar.len(),
                    actual: query.len(),
                }
                .to_string());
            }
            let similarity = cosine_similarity(&query, exemplar);
            if best.map_or(true, |(_, top)| similarity > top) {
                best = Some((*intent, similarity));
            }
        }

        Ok(best
            .filter(|(_, similarity)| *similarity >= self.confidence_floor)
            .map(|(intent, similarity)| IntentClassification {
                intent,
                confidence: similarity,
                source: IntentSource::Embedding,
                fallback_reason: None,
            }))
    }
}

fn cue_pattern(cue: &str) -> Result<Regex, regex::Error> {
    match cue.strip_suffix('*') {
        Some(stem) => Regex::new(&format!(r"(?i)\b{}", regex::escape(stem))),
        None => Regex::new(&format!(r"(?i)\b{}(?:e?s)?\b", regex::escape(cue))),
    }
}

fn embed_exemplars(embedder: &dyn IIntentEmbedder) -> LodestarResult<Vec<(Intent, Vec<f32>)>> {
    INTENT_EXEMPLARS
        .iter()
        .map(|(intent, text)| Ok((*intent, embedder.embed(text)?)))
        .collect()
}

/// Cosine similarity between two vectors; 0.0 for zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += *x as f64 * *y as f64;
        norm_a += *x as f64 * *x as f64;
        norm_b += *y as f64 * *y as f64;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
