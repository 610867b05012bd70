//! The repository facade.
//!
//! [`Repo`] composes the object database, reference store, index and
//! sidecar state over one gitDir, and carries the injectable ports for
//! credentials, hooks, signatures and HTTP discovery. Multiple `Repo`
//! instances may view the same directory; within one repository,
//! callers serialize mutations (receive-pack updates are additionally
//! CAS-guarded).

pub mod clone;
pub mod config;
pub mod error;
pub mod history;
pub mod info;
pub mod maintenance;
pub mod partial;
pub mod patches;
pub mod ports;
pub mod rebase;
pub mod receive;
pub mod repo;
pub mod sidecars;
pub mod worktree;

pub use clone::CloneOptions;
pub use error::{RepoError, RepoResult};
pub use history::LastModified;
pub use info::{RepoInfo, RepoStructure};
pub use maintenance::MaintenanceOptions;
pub use partial::{BackfillOptions, BackfillOutcome, BackfillStatus};
pub use ports::{
    Credential, CredentialPort, HookOutcome, HookPort, HookRequest, HttpPort, HttpResponse,
    ProgressEvent, SignaturePort,
};
pub use receive::ReceivePackUpdate;
pub use repo::{InitOptions, Repo};
pub use worktree::StatusReport;

/// Callback for long-running operations; invoked per phase step.
pub type ProgressCallback<'a> = &'a dyn Fn(&ports::ProgressEvent);
