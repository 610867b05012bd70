use girt_types::{ErrorKind, TypeError};

/// The facade error: every subsystem error converts into this, and
/// `kind()` exposes the taxonomy class callers dispatch on.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Odb(#[from] girt_odb::OdbError),

    #[error(transparent)]
    Refs(#[from] girt_refs::RefError),

    #[error(transparent)]
    Index(#[from] girt_index::IndexError),

    #[error(transparent)]
    Pathspec(#[from] girt_pathspec::PathspecError),

    #[error(transparent)]
    Diff(#[from] girt_diff::DiffError),

    #[error(transparent)]
    Proto(#[from] girt_protocol::ProtoError),

    #[error(transparent)]
    State(#[from] girt_state::StateError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Compare-and-swap failed: the ref moved under the caller.
    #[error("lock conflict on {refname}: expected {expected}, found {actual}")]
    LockConflict {
        refname: String,
        expected: String,
        actual: String,
    },

    #[error("authentication required for {0}")]
    AuthRequired(String),

    #[error("network error (status {status}): {message}")]
    Network { status: u16, message: String },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("signature invalid: {0}")]
    SignatureInvalid(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Odb(e) => e.kind(),
            Self::Refs(e) => e.kind(),
            Self::Index(e) => e.kind(),
            Self::Pathspec(e) => e.kind(),
            Self::Diff(e) => e.kind(),
            Self::Proto(e) => e.kind(),
            Self::State(e) => e.kind(),
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::LockConflict { .. } => ErrorKind::LockConflict,
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::Network { .. } => ErrorKind::Network,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
        }
    }
}

/// Result alias for facade operations.
pub type RepoResult<T> = Result<T, RepoError>;
