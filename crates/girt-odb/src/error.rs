use girt_types::{ErrorKind, ObjectId, TypeError};

/// Errors from object database operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    /// The requested object does not exist in loose storage.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The loose envelope or an object payload is malformed.
    #[error("object format error: {0}")]
    Format(String),

    /// Inflation-bomb guard tripped or promised content failed checks.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A pack container failed name or magic validation.
    #[error("pack format error: {0}")]
    PackFormat(String),

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OdbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Format(_) => ErrorKind::ObjectFormat,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::PackFormat(_) => ErrorKind::PackFormat,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result alias for object database operations.
pub type OdbResult<T> = Result<T, OdbError>;
