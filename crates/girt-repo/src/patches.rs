//! Patch apply and replay through the worktree, optionally driving
//! the index forward for every path that was written.

use girt_diff::{apply_unified_patch, replay, ReplayOutcome, ReplayStep};

use crate::error::RepoResult;
use crate::repo::Repo;

impl Repo {
    /// Apply one unified patch under the worktree. With `stage`, the
    /// written path is added to the index afterwards.
    pub fn apply_patch(&self, patch_text: &str, reverse: bool, stage: bool) -> RepoResult<String> {
        let path = apply_unified_patch(self.worktree()?, patch_text, reverse)?;
        if stage {
            self.add(std::slice::from_ref(&path))?;
        }
        Ok(path)
    }

    /// Replay patch steps in order, stopping at the first failure.
    ///
    /// Paths applied before a conflict stay on disk and, with `stage`,
    /// staged — the run makes progress rather than rolling back.
    pub fn replay_patches(&self, steps: &[ReplayStep], stage: bool) -> RepoResult<ReplayOutcome> {
        let outcome = replay(self.worktree()?, steps)?;
        if stage && !outcome.applied_paths.is_empty() {
            self.add(&outcome.applied_paths)?;
        }
        Ok(outcome)
    }
}
