use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::STOPWORDS;
use crate::intent::Intent;

/// Inclusive publication date window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// License tier a caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseTier {
    Open,
    Restricted,
    Licensed,
}

/// Structured filters passed through to every retriever.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    pub source_types: Vec<String>,
    pub date_range: Option<DateRange>,
    pub license_tier: Option<LicenseTier>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.source_types.is_empty() && self.date_range.is_none() && self.license_tier.is_none()
    }

    /// Order-insensitive canonical form, used for cache fingerprints.
    pub fn canonical(&self) -> String {
        let mut sources: Vec<String> = self
            .source_types
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        sources.sort();
        sources.dedup();

        let dates = match &self.date_range {
            Some(range) => format!(
                "{}..{}",
                range.from.map(|d| d.to_string()).unwrap_or_default(),
                range.to.map(|d| d.to_string()).unwrap_or_default()
            ),
            None => String::new(),
        };
        let tier = match self.license_tier {
            Some(LicenseTier::Open) => "open",
            Some(LicenseTier::Restricted) => "restricted",
            Some(LicenseTier::Licensed) => "licensed",
            None => "",
        };

        format!("sources={};dates={};tier={}", sources.join(","), dates, tier)
    }
}

/// What a downstream consumer submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub text: String,
    #[serde(default)]
    pub filters: QueryFilters,
    /// Skip classification and use this intent.
    pub intent_override: Option<Intent>,
    /// Client-supplied request ID; generated when absent.
    pub request_id: Option<String>,
    /// Truncate the merged list at response time.
    pub limit: Option<usize>,
}

impl RetrievalRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: QueryFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent_override = Some(intent);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An accepted request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    request_id: String,
    text: String,
    filters: QueryFilters,
}

impl Query {
    pub fn new(request_id: impl Into<String>, text: impl Into<String>, filters: QueryFilters) -> Self {
        Self {
            request_id: request_id.into(),
            text: text.into(),
            filters,
        }
    }

    /// Build from a request, generating a v4 request ID when none was supplied.
    pub fn from_request(request: &RetrievalRequest) -> Self {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self::new(request_id, request.text.clone(), request.filters.clone())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filters(&self) -> &QueryFilters {
        &self.filters
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Lowercased with whitespace runs collapsed.
    pub fn normalized_text(&self) -> String {
        self.text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Content terms for ontology lookups: lowercased, stopwords removed,
    /// first occurrence order, no duplicates.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for raw in self
            .text
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '/'))
        {
            let term = raw.trim_matches('-').to_lowercase();
            if term.is_empty() || STOPWORDS.contains(&term.as_str()) {
                continue;
            }
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_drop_stopwords_and_duplicates() {
        let q = Query::new("r1", "Does drugX reduce mortality? Mortality in MI", QueryFilters::default());
        assert_eq!(q.terms(), vec!["drugx", "reduce", "mortality", "mi"]);
    }

    #[test]
    fn normalized_text_collapses_whitespace_and_case() {
        let q = Query::new("r1", "  Does   DrugX\treduce mortality ", QueryFilters::default());
        assert_eq!(q.normalized_text(), "does drugx reduce mortality");
    }

    #[test]
    fn filter_canonical_form_ignores_order_and_case() {
        let a = QueryFilters {
            source_types: vec!["Trial".into(), "guideline".into()],
            ..Default::default()
        };
        let b = QueryFilters {
            source_types: vec!["guideline".into(), "trial".into(), "TRIAL".into()],
            ..Default::default()
        };
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn request_id_is_generated_when_missing() {
        let q = Query::from_request(&RetrievalRequest::new("dose of drugX"));
        assert!(!q.request_id().is_empty());
        let q = Query::from_request(&RetrievalRequest::new("x").with_request_id("client-7"));
        assert_eq!(q.request_id(), "client-7");
    }
}
