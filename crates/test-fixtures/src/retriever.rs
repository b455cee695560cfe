//! Scripted signal retriever.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lodestar_core::errors::{LodestarError, LodestarResult};
use lodestar_core::intent::Intent;
use lodestar_core::models::{Candidate, ExpandedQuery, QueryFilters, RetrieverTag};
use lodestar_core::traits::ISignalRetriever;

#[derive(Debug, Clone)]
enum Script {
    Return(Vec<Candidate>),
    Fail(String),
}

/// Returns a fixed list (or error) after an optional delay.
#[derive(Debug)]
pub struct ScriptedRetriever {
    tag: RetrieverTag,
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl ScriptedRetriever {
    pub fn returning(tag: RetrieverTag, candidates: Vec<Candidate>) -> Self {
        Self::with_script(tag, Script::Return(candidates))
    }

    pub fn empty(tag: RetrieverTag) -> Self {
        Self::returning(tag, Vec::new())
    }

    pub fn failing(tag: RetrieverTag, reason: &str) -> Self {
        Self::with_script(tag, Script::Fail(reason.to_string()))
    }

    fn with_script(tag: RetrieverTag, script: Script) -> Self {
        Self {
            tag,
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that ran to completion (were not cancelled).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ISignalRetriever for ScriptedRetriever {
    fn tag(&self) -> RetrieverTag {
        self.tag
    }

    async fn retrieve(
        &self,
        _query: &ExpandedQuery,
        _intent: Intent,
        _filters: &QueryFilters,
        top_k: usize,
    ) -> LodestarResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Return(candidates) => Ok(candidates.iter().take(top_k).cloned().collect()),
            Script::Fail(reason) => Err(LodestarError::backend(self.tag.as_str(), reason.as_str())),
        }
    }
}
