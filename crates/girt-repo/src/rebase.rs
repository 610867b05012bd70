//! Rebase lifecycle over the persisted state machine.

use girt_state::{files, read_state, store_state, RebaseState, RebaseStatus, RebaseStep};
use girt_types::ObjectId;

use crate::error::{RepoError, RepoResult};
use crate::repo::Repo;

impl Repo {
    fn rebase_path(&self) -> std::path::PathBuf {
        self.state_path(files::REBASE)
    }

    /// Begin a rebase of HEAD onto `onto` with the given plan.
    pub fn rebase_start(&self, onto: &ObjectId, steps: Vec<RebaseStep>) -> RepoResult<RebaseState> {
        if self.rebase_status()?.map(|s| s == RebaseStatus::Active) == Some(true) {
            return Err(RepoError::AlreadyExists("a rebase is already active".into()));
        }
        let original_head = self.resolve_head()?;
        let state = RebaseState::start(original_head, *onto, steps)?;
        store_state(&self.rebase_path(), &state)?;
        Ok(state)
    }

    /// Advance past the current step; terminal states are unchanged.
    pub fn rebase_continue(&self) -> RepoResult<RebaseState> {
        let mut state = self.load_rebase()?;
        state.advance();
        store_state(&self.rebase_path(), &state)?;
        Ok(state)
    }

    /// Abort an active rebase; terminal states are unchanged.
    pub fn rebase_abort(&self) -> RepoResult<RebaseState> {
        let mut state = self.load_rebase()?;
        state.abort();
        store_state(&self.rebase_path(), &state)?;
        Ok(state)
    }

    /// The current rebase status, if a rebase was ever started.
    pub fn rebase_status(&self) -> RepoResult<Option<RebaseStatus>> {
        if !self.rebase_path().exists() {
            return Ok(None);
        }
        Ok(Some(self.load_rebase()?.status))
    }

    fn load_rebase(&self) -> RepoResult<RebaseState> {
        if !self.rebase_path().exists() {
            return Err(RepoError::NotFound("no rebase in progress".into()));
        }
        Ok(read_state(&self.rebase_path())?)
    }
}
