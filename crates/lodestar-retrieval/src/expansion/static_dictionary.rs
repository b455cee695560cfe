//! Built-in clinical concept dictionary.
//!
//! Abbreviations and common synonyms seen in trial reports and labels.
//! E.g., "mi" → "myocardial infarction", "nsaid" → "anti-inflammatory agent".

use std::collections::HashMap;

use async_trait::async_trait;
use lodestar_core::errors::LodestarResult;
use lodestar_core::models::{RelatedConcept, RelationType};
use lodestar_core::traits::IConceptDictionary;

use RelationType::{Hypernym, Synonym};

type Entry = (&'static str, RelationType, f64);

fn concept_map() -> HashMap<&'static str, &'static [Entry]> {
    let mut m: HashMap<&'static str, &'static [Entry]> = HashMap::new();
    m.insert(
        "mi",
        &[
            ("myocardial infarction", Synonym, 0.95),
            ("heart attack", Synonym, 0.9),
            ("acute coronary syndrome", Hypernym, 0.7),
        ],
    );
    m.insert(
        "ae",
        &[("adverse event", Synonym, 0.95), ("side effect", Synonym, 0.8)],
    );
    m.insert(
        "sae",
        &[("serious adverse event", Synonym, 0.95), ("adverse event", Hypernym, 0.75)],
    );
    m.insert(
        "nsaid",
        &[
            ("non-steroidal anti-inflammatory drug", Synonym, 0.95),
            ("anti-inflammatory agent", Hypernym, 0.8),
            ("analgesic", Hypernym, 0.6),
        ],
    );
    m.insert(
        "mortality",
        &[("death", Synonym, 0.85), ("all-cause mortality", Synonym, 0.7), ("survival", Synonym, 0.55)],
    );
    m.insert(
        "hf",
        &[("heart failure", Synonym, 0.95), ("cardiovascular disease", Hypernym, 0.6)],
    );
    m.insert(
        "htn",
        &[("hypertension", Synonym, 0.95), ("high blood pressure", Synonym, 0.9)],
    );
    m.insert(
        "t2dm",
        &[
            ("type 2 diabetes", Synonym, 0.95),
            ("diabetes mellitus", Hypernym, 0.75),
        ],
    );
    m.insert(
        "copd",
        &[
            ("chronic obstructive pulmonary disease", Synonym, 0.95),
            ("lung disease", Hypernym, 0.6),
        ],
    );
    m.insert("ckd", &[("chronic kidney disease", Synonym, 0.95)]);
    m.insert("afib", &[("atrial fibrillation", Synonym, 0.95), ("arrhythmia", Hypernym, 0.7)]);
    m.insert("hr", &[("hazard ratio", Synonym, 0.7)]);
    m.insert("pfs", &[("progression-free survival", Synonym, 0.95)]);
    m.insert("os", &[("overall survival", Synonym, 0.85)]);
    m.insert(
        "rct",
        &[("randomized controlled trial", Synonym, 0.95), ("clinical trial", Hypernym, 0.7)],
    );
    m.insert("bid", &[("twice daily", Synonym, 0.9)]);
    m.insert("qd", &[("once daily", Synonym, 0.9)]);
    m.insert(
        "toxicity",
        &[("adverse effect", Synonym, 0.7), ("safety", Hypernym, 0.5)],
    );
    m.insert(
        "statin",
        &[
            ("hmg-coa reductase inhibitor", Synonym, 0.9),
            ("lipid-lowering agent", Hypernym, 0.75),
        ],
    );
    m
}

/// Concept dictionary over the built-in clinical table.
pub struct StaticConceptDictionary {
    entries: HashMap<&'static str, &'static [Entry]>,
}

impl StaticConceptDictionary {
    pub fn new() -> Self {
        Self {
            entries: concept_map(),
        }
    }

    /// Number of terms with at least one related concept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticConceptDictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IConceptDictionary for StaticConceptDictionary {
    async fn related(&self, term: &str) -> LodestarResult<Vec<RelatedConcept>> {
        let key = term.trim().to_lowercase();
        Ok(self
            .entries
            .get(key.as_str())
            .map(|entries| {
                entries
                    .iter()
                    .map(|(term, relation, confidence)| RelatedConcept {
                        term: (*term).to_string(),
                        relation: *relation,
                        confidence: *confidence,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "static-clinical"
    }
}
