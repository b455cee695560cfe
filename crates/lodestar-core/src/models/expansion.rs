use serde::{Deserialize, Serialize};

/// How an expansion term relates to the term it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Synonym,
    Hypernym,
}

/// One entry returned by a concept dictionary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedConcept {
    pub term: String,
    pub relation: RelationType,
    /// Dictionary confidence in [0, 1].
    pub confidence: f64,
}

/// An added term, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermExpansion {
    pub source_term: String,
    pub term: String,
    pub relation: RelationType,
    pub confidence: f64,
}

/// Original query terms plus bounded, advisory additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTerms {
    pub original: Vec<String>,
    pub additions: Vec<TermExpansion>,
}

impl ExpandedTerms {
    /// The original terms with nothing added.
    pub fn unexpanded(original: Vec<String>) -> Self {
        Self {
            original,
            additions: Vec::new(),
        }
    }

    pub fn is_expanded(&self) -> bool {
        !self.additions.is_empty()
    }

    pub fn additions_for<'a>(&'a self, source_term: &'a str) -> impl Iterator<Item = &'a TermExpansion> {
        self.additions
            .iter()
            .filter(move |a| a.source_term == source_term)
    }

    /// Original terms followed by additions, without duplicates.
    pub fn all_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.original.iter().map(String::as_str).collect();
        for addition in &self.additions {
            if !terms.contains(&addition.term.as_str()) {
                terms.push(addition.term.as_str());
            }
        }
        terms
    }
}

/// What every retriever receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedQuery {
    /// The caller's raw text.
    pub text: String,
    pub terms: ExpandedTerms,
}

impl ExpandedQuery {
    /// Raw text followed by the added terms.
    pub fn expanded_text(&self) -> String {
        if !self.terms.is_expanded() {
            return self.text.clone();
        }
        let additions: Vec<&str> = self.terms.additions.iter().map(|a| a.term.as_str()).collect();
        format!("{} {}", self.text, additions.join(" "))
    }
}
