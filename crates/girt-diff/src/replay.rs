//! Ordered patch replay.
//!
//! Steps apply strictly in sequence; the first failure stops the run
//! and reports which step failed. Steps already applied stay on disk
//! — replay is a best-effort sequential apply, not a transaction, and
//! callers needing all-or-nothing must snapshot beforehand.

use std::path::Path;

use crate::error::{DiffError, DiffResult};
use crate::patch::apply_unified_patch;

/// One replay step: a patch and its direction.
#[derive(Clone, Debug)]
pub struct ReplayStep {
    pub patch_text: String,
    pub reverse: bool,
}

/// Terminal state of a replay run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayStatus {
    Completed,
    Conflict,
}

/// What a replay run did.
#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    pub status: ReplayStatus,
    /// Paths written, in application order.
    pub applied_paths: Vec<String>,
    /// Index of the failing step, if any.
    pub failed_step: Option<usize>,
}

/// Apply `steps` in order under `root`.
pub fn replay(root: &Path, steps: &[ReplayStep]) -> DiffResult<ReplayOutcome> {
    if steps.is_empty() {
        return Err(DiffError::InvalidArgument("replay needs at least one step".into()));
    }

    let mut applied_paths = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        match apply_unified_patch(root, &step.patch_text, step.reverse) {
            Ok(path) => applied_paths.push(path),
            Err(_) => {
                return Ok(ReplayOutcome {
                    status: ReplayStatus::Conflict,
                    applied_paths,
                    failed_step: Some(i),
                })
            }
        }
    }

    Ok(ReplayOutcome {
        status: ReplayStatus::Completed,
        applied_paths,
        failed_step: None,
    })
}
