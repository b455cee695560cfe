//! Per-request state trace.

use lodestar_core::errors::RetrievalError;
use lodestar_core::models::PipelineState;
use lodestar_observability::tracing_setup::events;

/// Records the states one request visits and rejects illegal transitions.
#[derive(Debug, Clone)]
pub struct StateTrace {
    request_id: String,
    visited: Vec<PipelineState>,
}

impl StateTrace {
    /// A fresh request in `received`.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self::resume(request_id, PipelineState::Received)
    }

    /// Continue a request from `state`; only later states are recorded.
    pub fn resume(request_id: impl Into<String>, state: PipelineState) -> Self {
        Self {
            request_id: request_id.into(),
            visited: vec![state],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.visited
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    pub fn advance(&mut self, next: PipelineState) -> Result<(), RetrievalError> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(RetrievalError::IllegalTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        events::state_transition(&self.request_id, current.as_str(), next.as_str());
        self.visited.push(next);
        Ok(())
    }

    /// Move to `error` unless already terminal.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            let _ = self.advance(PipelineState::Error);
        }
    }

    /// Replay states recorded by another trace of the same pipeline.
    pub fn absorb(&mut self, states: &[PipelineState]) -> Result<(), RetrievalError> {
        for &state in states {
            if state != self.current() {
                self.advance(state)?;
            }
        }
        Ok(())
    }

    /// States after the starting one.
    pub fn into_states(self) -> Vec<PipelineState> {
        self.visited.into_iter().skip(1).collect()
    }

    pub fn visited(&self) -> &[PipelineState] {
        &self.visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn forward_chain_is_recorded() {
        let mut trace = StateTrace::new("r");
        for s in [Expanding, FanningOut, Fusing, Merging, Caching, Completed] {
            trace.advance(s).unwrap();
        }
        assert_eq!(trace.visited().len(), 7);
        assert_eq!(trace.current(), Completed);
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut trace = StateTrace::new("r");
        let err = trace.advance(Fusing).unwrap_err();
        assert_eq!(
            err,
            RetrievalError::IllegalTransition {
                from: "received".into(),
                to: "fusing".into()
            }
        );
        assert_eq!(trace.current(), Received);
    }

    #[test]
    fn absorbed_states_continue_the_chain() {
        let mut leader = StateTrace::resume("r", Expanding);
        leader.advance(FanningOut).unwrap();
        leader.advance(Fusing).unwrap();

        let mut follower = StateTrace::new("f");
        follower.advance(Expanding).unwrap();
        follower.absorb(&leader.into_states()).unwrap();
        assert_eq!(follower.visited(), &[Received, Expanding, FanningOut, Fusing]);
    }

    #[test]
    fn fail_is_idempotent_on_terminal_states() {
        let mut trace = StateTrace::new("r");
        trace.fail();
        trace.fail();
        assert_eq!(trace.visited(), &[Received, Error]);
    }
}
