use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::models::RetrieverTag;

use super::taxonomy::Intent;

/// Default fusion weight for a retriever under a given intent.
///
/// Each intent's four weights sum to `WEIGHT_PROFILE_TOTAL`.
pub fn default_weight(intent: Intent, retriever: RetrieverTag) -> f64 {
    use RetrieverTag::{Dense, Graph, Lexical, Sparse};

    match (intent, retriever) {
        // PICO framing is phrased loosely; dense carries most of it.
        (Intent::Pico, Lexical) => 0.25,
        (Intent::Pico, Sparse) => 0.25,
        (Intent::Pico, Dense) => 0.35,
        (Intent::Pico, Graph) => 0.15,

        // Endpoints are named precisely (mortality, PFS, HbA1c).
        (Intent::Endpoint, Lexical) => 0.30,
        (Intent::Endpoint, Sparse) => 0.30,
        (Intent::Endpoint, Dense) => 0.25,
        (Intent::Endpoint, Graph) => 0.15,

        // Adverse events lean on exact terms and drug-event graph links.
        (Intent::AdverseEvent, Lexical) => 0.35,
        (Intent::AdverseEvent, Sparse) => 0.20,
        (Intent::AdverseEvent, Dense) => 0.15,
        (Intent::AdverseEvent, Graph) => 0.30,

        // Dosing is numbers and units: lexical first.
        (Intent::Dose, Lexical) => 0.40,
        (Intent::Dose, Sparse) => 0.30,
        (Intent::Dose, Dense) => 0.20,
        (Intent::Dose, Graph) => 0.10,

        (Intent::Eligibility, Lexical) => 0.30,
        (Intent::Eligibility, Sparse) => 0.25,
        (Intent::Eligibility, Dense) => 0.30,
        (Intent::Eligibility, Graph) => 0.15,

        (Intent::General, Lexical) => 0.30,
        (Intent::General, Sparse) => 0.25,
        (Intent::General, Dense) => 0.30,
        (Intent::General, Graph) => 0.15,
    }
}

/// Parse weight overrides from the `[fusion.weights.<intent>]` TOML tables.
///
/// Outer keys are intent names, inner keys retriever names.
pub fn parse_weight_overrides(
    overrides: &BTreeMap<String, BTreeMap<String, f64>>,
) -> Result<HashMap<(Intent, RetrieverTag), f64>, ConfigError> {
    let mut map = HashMap::new();
    for (intent_name, table) in overrides {
        let intent = Intent::from_str(intent_name)?;
        for (retriever_name, &value) in table {
            let retriever = RetrieverTag::from_str(retriever_name)?;
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeightProfile {
                    intent: intent.to_string(),
                    reason: format!("weight for {retriever} must be a non-negative number"),
                });
            }
            map.insert((intent, retriever), value);
        }
    }
    Ok(map)
}
