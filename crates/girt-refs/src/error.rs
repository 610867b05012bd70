use girt_types::{ErrorKind, TypeError};

/// Errors from reference store operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// The ref does not exist in loose or packed form.
    #[error("ref not found: {0}")]
    NotFound(String),

    /// Attempted to create a ref that already resolves.
    #[error("ref already exists: {0}")]
    AlreadyExists(String),

    /// HEAD or a ref file holds something that is not an OID or
    /// symbolic target.
    #[error("ref format error: {0}")]
    Format(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Format(_) => ErrorKind::ObjectFormat,
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result alias for reference store operations.
pub type RefResult<T> = Result<T, RefError>;
