//! Tree payload parsing and construction.
//!
//! A tree is a sequence of `<octal-mode> SP <name> NUL <raw-oid-bytes>`
//! entries; the OID is in the hash's binary form (20 or 32 bytes), so
//! parsing needs the repository's hash width.

use girt_types::{HashAlgorithm, ObjectId};

use crate::error::{OdbError, OdbResult};

/// What a tree entry points at, derived from its mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEntryKind {
    /// Any blob mode (0o100644, 0o100755, 0o120000, …).
    File,
    /// 0o040000: a subtree.
    Directory,
    /// 0o160000: a submodule commit pointer.
    Gitlink,
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: u32,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn kind(&self) -> TreeEntryKind {
        match self.mode {
            0o040000 => TreeEntryKind::Directory,
            0o160000 => TreeEntryKind::Gitlink,
            _ => TreeEntryKind::File,
        }
    }
}

/// Parse a tree payload given the repository's hash algorithm.
pub fn parse_tree(payload: &[u8], algo: HashAlgorithm) -> OdbResult<Vec<TreeEntry>> {
    let oid_len = algo.raw_len();
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos < payload.len() {
        let sp = payload[pos..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| OdbError::Format("tree entry missing space after mode".into()))?;
        let mode_str = std::str::from_utf8(&payload[pos..pos + sp])
            .map_err(|_| OdbError::Format("tree entry mode is not ASCII".into()))?;
        let mode = u32::from_str_radix(mode_str, 8)
            .map_err(|_| OdbError::Format(format!("tree entry mode not octal: {mode_str:?}")))?;
        pos += sp + 1;

        let nul = payload[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| OdbError::Format("tree entry missing NUL after name".into()))?;
        let name = std::str::from_utf8(&payload[pos..pos + nul])
            .map_err(|_| OdbError::Format("tree entry name is not UTF-8".into()))?
            .to_string();
        if name.is_empty() || name.contains('/') {
            return Err(OdbError::Format(format!("invalid tree entry name: {name:?}")));
        }
        pos += nul + 1;

        if payload.len() < pos + oid_len {
            return Err(OdbError::Format("tree entry truncated before OID".into()));
        }
        let oid = ObjectId::from_raw(&payload[pos..pos + oid_len])?;
        pos += oid_len;

        entries.push(TreeEntry { mode, name, oid });
    }

    Ok(entries)
}

/// Serialize entries into a tree payload, sorted by name.
pub fn build_tree(mut entries: Vec<TreeEntry>) -> Vec<u8> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let mut out = Vec::new();
    for entry in &entries {
        out.extend_from_slice(format!("{:o}", entry.mode).as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.oid.as_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: &str) -> ObjectId {
        ObjectId::from_hex(&fill.repeat(40)).unwrap()
    }

    #[test]
    fn roundtrip() {
        let entries = vec![
            TreeEntry {
                mode: 0o100644,
                name: "b.txt".into(),
                oid: oid("a"),
            },
            TreeEntry {
                mode: 0o040000,
                name: "a-dir".into(),
                oid: oid("b"),
            },
        ];
        let payload = build_tree(entries);
        let parsed = parse_tree(&payload, HashAlgorithm::Sha1).unwrap();
        // build_tree sorts by name.
        assert_eq!(parsed[0].name, "a-dir");
        assert_eq!(parsed[1].name, "b.txt");
        assert_eq!(parsed[0].kind(), TreeEntryKind::Directory);
        assert_eq!(parsed[1].kind(), TreeEntryKind::File);
    }

    #[test]
    fn gitlink_mode() {
        let entry = TreeEntry {
            mode: 0o160000,
            name: "vendor".into(),
            oid: oid("c"),
        };
        assert_eq!(entry.kind(), TreeEntryKind::Gitlink);
        let parsed = parse_tree(&build_tree(vec![entry]), HashAlgorithm::Sha1).unwrap();
        assert_eq!(parsed[0].kind(), TreeEntryKind::Gitlink);
    }

    #[test]
    fn executable_is_a_file() {
        let entry = TreeEntry {
            mode: 0o100755,
            name: "run.sh".into(),
            oid: oid("d"),
        };
        assert_eq!(entry.kind(), TreeEntryKind::File);
    }

    #[test]
    fn empty_tree() {
        assert!(parse_tree(b"", HashAlgorithm::Sha1).unwrap().is_empty());
        assert!(build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn sha256_width() {
        let wide = ObjectId::from_hex(&"e".repeat(64)).unwrap();
        let entry = TreeEntry {
            mode: 0o100644,
            name: "wide.txt".into(),
            oid: wide,
        };
        let payload = build_tree(vec![entry]);
        let parsed = parse_tree(&payload, HashAlgorithm::Sha256).unwrap();
        assert_eq!(parsed[0].oid, wide);
    }

    #[test]
    fn truncated_oid_rejected() {
        let mut payload = b"100644 x\0".to_vec();
        payload.extend_from_slice(&[0u8; 10]); // only half an OID
        let err = parse_tree(&payload, HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, OdbError::Format(_)));
    }

    #[test]
    fn name_with_slash_rejected() {
        let mut payload = b"100644 a/b\0".to_vec();
        payload.extend_from_slice(&[0u8; 20]);
        let err = parse_tree(&payload, HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, OdbError::Format(_)));
    }

    #[test]
    fn non_octal_mode_rejected() {
        let err = parse_tree(b"99x644 a\0", HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, OdbError::Format(_)));
    }
}
