use girt_types::{ErrorKind, TypeError};

/// Errors from patch parsing and application.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The patch text lacks a usable `+++ b/<path>` target line.
    #[error("patch format error: {0}")]
    Format(String),

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::ObjectFormat,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result alias for patch operations.
pub type DiffResult<T> = Result<T, DiffError>;
