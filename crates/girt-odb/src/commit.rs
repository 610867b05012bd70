//! Commit payload parsing.
//!
//! Only the header block is interpreted: a mandatory `tree` line, zero
//! or more `parent` lines, and (for signature verification) an optional
//! `gpgsig` header with its continuation lines. Everything after the
//! first blank line is the free-form message.

use girt_types::ObjectId;

use crate::error::{OdbError, OdbResult};

/// The header fields history operations need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitInfo {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
}

/// Extract `tree` and `parent` OIDs from a commit payload.
///
/// A commit without a `tree` header is rejected.
pub fn parse_commit(payload: &[u8]) -> OdbResult<CommitInfo> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| OdbError::Format("commit payload is not UTF-8".into()))?;

    let mut tree = None;
    let mut parents = Vec::new();

    for line in text.lines() {
        if line.is_empty() {
            break; // header ends, message begins
        }
        if let Some(oid) = line.strip_prefix("tree ") {
            tree = Some(ObjectId::from_hex(oid.trim()).map_err(|e| {
                OdbError::Format(format!("commit tree header is not an OID: {e}"))
            })?);
        } else if let Some(oid) = line.strip_prefix("parent ") {
            parents.push(ObjectId::from_hex(oid.trim()).map_err(|e| {
                OdbError::Format(format!("commit parent header is not an OID: {e}"))
            })?);
        }
    }

    let tree = tree.ok_or_else(|| OdbError::Format("commit is missing a tree header".into()))?;
    Ok(CommitInfo { tree, parents })
}

/// Split a commit payload into its `gpgsig` signature and the payload
/// with that header removed (the bytes the signature covers).
///
/// Returns `None` when the commit carries no signature.
pub fn split_signature(payload: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let text = std::str::from_utf8(payload).ok()?;

    let mut signature = String::new();
    let mut stripped = String::new();
    let mut in_sig = false;
    let mut in_header = true;
    let mut found = false;

    for line in text.split_inclusive('\n') {
        let bare = line.strip_suffix('\n').unwrap_or(line);
        if in_header {
            if bare.is_empty() {
                in_header = false;
                in_sig = false;
            } else if let Some(first) = bare.strip_prefix("gpgsig ") {
                in_sig = true;
                found = true;
                signature.push_str(first);
                signature.push('\n');
                continue;
            } else if in_sig && bare.starts_with(' ') {
                signature.push_str(&bare[1..]);
                signature.push('\n');
                continue;
            } else {
                in_sig = false;
            }
        }
        stripped.push_str(line);
    }

    if found {
        Some((signature.into_bytes(), stripped.into_bytes()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const PARENT: &str = "3b18e512dbf917784842c37b2f9f47a26d43a2ad";

    fn commit_text(parents: &[&str]) -> String {
        let mut s = format!("tree {TREE}\n");
        for p in parents {
            s.push_str(&format!("parent {p}\n"));
        }
        s.push_str("author A <a@example.com> 0 +0000\n");
        s.push_str("committer A <a@example.com> 0 +0000\n");
        s.push_str("\nmessage body\n");
        s
    }

    #[test]
    fn parses_root_commit() {
        let info = parse_commit(commit_text(&[]).as_bytes()).unwrap();
        assert_eq!(info.tree.to_hex(), TREE);
        assert!(info.parents.is_empty());
    }

    #[test]
    fn parses_merge_commit() {
        let other = "a".repeat(40);
        let info = parse_commit(commit_text(&[PARENT, &other]).as_bytes()).unwrap();
        assert_eq!(info.parents.len(), 2);
        assert_eq!(info.parents[0].to_hex(), PARENT);
        assert_eq!(info.parents[1].to_hex(), other);
    }

    #[test]
    fn missing_tree_is_rejected() {
        let payload = format!("parent {PARENT}\n\nmsg\n");
        let err = parse_commit(payload.as_bytes()).unwrap_err();
        assert!(matches!(err, OdbError::Format(_)));
    }

    #[test]
    fn tree_in_message_does_not_count() {
        let payload = format!("parent {PARENT}\n\ntree {TREE}\n");
        assert!(parse_commit(payload.as_bytes()).is_err());
    }

    #[test]
    fn malformed_tree_oid_is_rejected() {
        let err = parse_commit(b"tree nothex\n\nmsg\n").unwrap_err();
        assert!(matches!(err, OdbError::Format(_)));
    }

    #[test]
    fn split_signature_none_when_unsigned() {
        assert!(split_signature(commit_text(&[]).as_bytes()).is_none());
    }

    #[test]
    fn split_signature_extracts_continuations() {
        let payload = format!(
            "tree {TREE}\ngpgsig -----BEGIN PGP SIGNATURE-----\n line2\n -----END PGP SIGNATURE-----\nauthor A <a@e> 0 +0000\n\nmsg\n"
        );
        let (sig, stripped) = split_signature(payload.as_bytes()).unwrap();
        let sig = String::from_utf8(sig).unwrap();
        assert!(sig.starts_with("-----BEGIN PGP SIGNATURE-----\n"));
        assert!(sig.contains("line2"));
        let stripped = String::from_utf8(stripped).unwrap();
        assert!(!stripped.contains("gpgsig"));
        assert!(stripped.contains("author A"));
        // The stripped payload still parses.
        assert!(parse_commit(stripped.as_bytes()).is_ok());
    }
}
