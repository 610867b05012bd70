//! Sidecar state persisted next to the canonical git layout.
//!
//! Each state family lives in its own JSON file, rewritten whole on
//! every mutation. Loading is strict: a file that exists but does not
//! hold a JSON object of the expected shape is rejected rather than
//! silently reset.

pub mod error;
pub mod partial;
pub mod persist;
pub mod rebase;
pub mod sidecar;

pub use error::{StateError, StateResult};
pub use partial::{validate_promisor_payload, PartialCloneState};
pub use persist::{load_state, read_state, store_state};
pub use rebase::{RebaseState, RebaseStatus, RebaseStep};
pub use sidecar::{
    MaintenanceReport, NotesState, RemoteConfig, RemotesState, ReplaceState, SparseState,
    StashEntry, StashState, SubmoduleConfig, SubmodulesState, WorktreeEntry, WorktreesState,
};

/// On-disk names, relative to the gitDir.
pub mod files {
    pub const REBASE: &str = "rebase-codex/state.json";
    pub const STASH: &str = "stash-codex.json";
    pub const REMOTES: &str = "remotes-codex.json";
    pub const SUBMODULES: &str = "submodules-codex.json";
    pub const WORKTREES: &str = "worktrees-codex.json";
    pub const SPARSE: &str = "info/sparse-checkout-codex.json";
    pub const PARTIAL_CLONE: &str = "partial-clone-codex.json";
    pub const MAINTENANCE: &str = "maintenance-codex.json";
    pub const NOTES: &str = "notes-codex.json";
    pub const REPLACE: &str = "replace-codex.json";
}
