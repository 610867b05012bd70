/// The error taxonomy shared across the workspace.
///
/// Every crate-level error maps into exactly one of these kinds via its
/// `kind()` method. Callers that only care about the class of a failure
/// (retry? reject? surface to the user?) match on the kind; callers that
/// need detail match on the concrete error enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Io,
    LockConflict,
    ObjectFormat,
    PackFormat,
    Proto,
    Unsupported,
    Integrity,
    Network,
    Timeout,
    Cancelled,
    AuthRequired,
    AuthRejected,
    MergeConflict,
    RebaseConflict,
    SignatureInvalid,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Io => "IO_ERROR",
            Self::LockConflict => "LOCK_CONFLICT",
            Self::ObjectFormat => "OBJECT_FORMAT_ERROR",
            Self::PackFormat => "PACK_FORMAT_ERROR",
            Self::Proto => "PROTO_ERROR",
            Self::Unsupported => "UNSUPPORTED",
            Self::Integrity => "INTEGRITY_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthRejected => "AUTH_REJECTED",
            Self::MergeConflict => "MERGE_CONFLICT",
            Self::RebaseConflict => "REBASE_CONFLICT",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
        };
        f.write_str(name)
    }
}

/// Errors from parsing the core types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The string is not a well-formed lowercase hex OID.
    #[error("invalid object id {text:?}: {reason}")]
    InvalidOid { text: String, reason: String },

    /// Raw OID bytes are neither 20 nor 32 bytes long.
    #[error("invalid object id length: {actual} bytes")]
    InvalidOidLength { actual: usize },

    /// An unrecognized object type tag.
    #[error("unknown object kind: {0:?}")]
    UnknownObjectKind(String),

    /// A worktree-relative path failed the safety checks.
    #[error("unsafe path {path:?}: {reason}")]
    UnsafePath { path: String, reason: String },
}

impl TypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidOid { .. } | Self::InvalidOidLength { .. } => ErrorKind::InvalidArgument,
            Self::UnknownObjectKind(_) => ErrorKind::ObjectFormat,
            Self::UnsafePath { .. } => ErrorKind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_names() {
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "INVALID_ARGUMENT");
        assert_eq!(ErrorKind::LockConflict.to_string(), "LOCK_CONFLICT");
        assert_eq!(ErrorKind::Integrity.to_string(), "INTEGRITY_ERROR");
        assert_eq!(ErrorKind::SignatureInvalid.to_string(), "SIGNATURE_INVALID");
    }

    #[test]
    fn type_errors_map_to_kinds() {
        let err = TypeError::InvalidOid {
            text: "xyz".into(),
            reason: "not hex".into(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = TypeError::UnknownObjectKind("blub".into());
        assert_eq!(err.kind(), ErrorKind::ObjectFormat);
    }
}
