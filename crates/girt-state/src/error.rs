use girt_types::{ErrorKind, TypeError};

/// Errors from sidecar state handling.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A state file exists but does not deserialize to its schema.
    #[error("state file {file} is malformed: {reason}")]
    Malformed { file: String, reason: String },

    /// A promisor payload or similar integrity-checked value failed
    /// validation.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. } => ErrorKind::Integrity,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result alias for state operations.
pub type StateResult<T> = Result<T, StateError>;
