//! The rebase lifecycle.
//!
//! `active → active` on each continue (advancing the step cursor),
//! `active → completed` when the cursor reaches the end,
//! `active → aborted` on abort. Terminal states are stable: continue
//! and abort are no-ops once the rebase has finished either way.

use serde::{Deserialize, Serialize};

use girt_types::ObjectId;

use crate::error::{StateError, StateResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebaseStatus {
    Active,
    Completed,
    Aborted,
}

/// One step of the rebase plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebaseStep {
    /// The commit being replayed.
    pub commit: ObjectId,
    /// Human-readable summary for status output.
    pub summary: String,
}

/// Persisted rebase state (`rebase-codex/state.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebaseState {
    pub original_head: ObjectId,
    pub onto: ObjectId,
    pub steps: Vec<RebaseStep>,
    pub current_index: usize,
    pub status: RebaseStatus,
}

impl RebaseState {
    /// Begin a rebase. The plan must be non-empty.
    pub fn start(
        original_head: ObjectId,
        onto: ObjectId,
        steps: Vec<RebaseStep>,
    ) -> StateResult<Self> {
        if steps.is_empty() {
            return Err(StateError::InvalidArgument(
                "rebase plan must contain at least one step".into(),
            ));
        }
        Ok(Self {
            original_head,
            onto,
            steps,
            current_index: 0,
            status: RebaseStatus::Active,
        })
    }

    /// Advance past the current step. Transitions to `Completed` when
    /// the cursor reaches the end; ignored in terminal states.
    pub fn advance(&mut self) {
        if self.status != RebaseStatus::Active {
            return;
        }
        self.current_index += 1;
        if self.current_index >= self.steps.len() {
            self.status = RebaseStatus::Completed;
        }
    }

    /// Abort an active rebase; ignored in terminal states.
    pub fn abort(&mut self) {
        if self.status == RebaseStatus::Active {
            self.status = RebaseStatus::Aborted;
        }
    }

    /// The step the rebase is currently stopped at, if any.
    pub fn current_step(&self) -> Option<&RebaseStep> {
        (self.status == RebaseStatus::Active)
            .then(|| self.steps.get(self.current_index))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: &str) -> ObjectId {
        ObjectId::from_hex(&fill.repeat(40)).unwrap()
    }

    fn plan(n: usize) -> Vec<RebaseStep> {
        (0..n)
            .map(|i| RebaseStep {
                commit: oid(&i.to_string()),
                summary: format!("step {i}"),
            })
            .collect()
    }

    #[test]
    fn start_requires_steps() {
        let err = RebaseState::start(oid("a"), oid("b"), Vec::new()).unwrap_err();
        assert!(matches!(err, StateError::InvalidArgument(_)));
    }

    #[test]
    fn advance_to_completion() {
        let mut state = RebaseState::start(oid("a"), oid("b"), plan(2)).unwrap();
        assert_eq!(state.status, RebaseStatus::Active);
        assert_eq!(state.current_step().unwrap().summary, "step 0");

        state.advance();
        assert_eq!(state.status, RebaseStatus::Active);
        assert_eq!(state.current_index, 1);

        state.advance();
        assert_eq!(state.status, RebaseStatus::Completed);
    }

    #[test]
    fn completed_is_stable() {
        let mut state = RebaseState::start(oid("a"), oid("b"), plan(1)).unwrap();
        state.advance();
        assert_eq!(state.status, RebaseStatus::Completed);
        let index = state.current_index;
        state.advance();
        state.abort();
        assert_eq!(state.status, RebaseStatus::Completed);
        assert_eq!(state.current_index, index);
    }

    #[test]
    fn abort_is_stable() {
        let mut state = RebaseState::start(oid("a"), oid("b"), plan(3)).unwrap();
        state.abort();
        assert_eq!(state.status, RebaseStatus::Aborted);
        state.advance();
        assert_eq!(state.status, RebaseStatus::Aborted);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn no_current_step_after_terminal() {
        let mut state = RebaseState::start(oid("a"), oid("b"), plan(1)).unwrap();
        state.abort();
        assert!(state.current_step().is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let state = RebaseState::start(oid("a"), oid("b"), plan(2)).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: RebaseState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(json.contains("\"active\""));
    }
}
