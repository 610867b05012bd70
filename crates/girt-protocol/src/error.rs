use girt_types::ErrorKind;

/// Errors from protocol framing and negotiation.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// A pkt-line frame is mis-sized or otherwise malformed.
    #[error("pkt-line framing error: {0}")]
    Framing(String),

    /// The peer lacks a capability the operation requires.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProtoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Framing(_) => ErrorKind::Proto,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// Result alias for protocol operations.
pub type ProtoResult<T> = Result<T, ProtoError>;
