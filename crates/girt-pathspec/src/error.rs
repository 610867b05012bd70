use girt_types::{ErrorKind, TypeError};

/// Errors from matcher compilation.
#[derive(Debug, thiserror::Error)]
pub enum PathspecError {
    /// A glob failed to compile into a regex.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl PathspecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPattern { .. } => ErrorKind::InvalidArgument,
            Self::Type(e) => e.kind(),
        }
    }
}

/// Result alias for matcher operations.
pub type PathspecResult<T> = Result<T, PathspecError>;
