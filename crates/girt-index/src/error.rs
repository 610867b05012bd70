use girt_types::{ErrorKind, TypeError};

/// Errors from index decode/encode.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The payload matches neither the binary nor the JSON layout.
    #[error("index format error: {0}")]
    Format(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::ObjectFormat,
            Self::Type(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
