use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use girt_types::ObjectId;

use crate::error::{IndexError, IndexResult};

/// The 8-byte magic: `DIRC` + big-endian version 2.
pub const INDEX_MAGIC: &[u8; 8] = b"DIRC\0\0\0\x02";

/// Mode recorded when an entry carries none: 0o100644.
pub const DEFAULT_FILE_MODE: u32 = 0o100644;

/// Stat prefix bytes before the OID in a binary entry:
/// ctime/mtime (16) + dev/ino/mode/uid/gid/size (24).
const STAT_PREFIX: usize = 40;

/// A staged file: worktree-relative path, blob OID, file mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    pub oid: ObjectId,
    pub mode: u32,
}

/// The staging index. Entries are totally ordered by path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Index {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            version: 2,
            entries: Vec::new(),
        }
    }
}

impl Index {
    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Insert or replace the entry for a path, keeping path order.
    pub fn upsert(&mut self, entry: IndexEntry) {
        match self.entries.binary_search_by(|e| e.path.cmp(&entry.path)) {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    /// Remove the entry for a path. Returns `true` if it existed.
    pub fn remove(&mut self, path: &str) -> bool {
        match self.entries.binary_search_by(|e| e.path.as_str().cmp(path)) {
            Ok(i) => {
                self.entries.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Load from disk; a missing file is an empty version-2 index.
    pub fn load(path: &Path) -> IndexResult<Self> {
        match fs::read(path) {
            Ok(bytes) => Self::decode(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the canonical encoding in one replacement write.
    pub fn store(&self, path: &Path) -> IndexResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.encode())?;
        Ok(())
    }

    /// Canonical emission: magic, then the JSON payload with entries
    /// sorted by path.
    pub fn encode(&self) -> Vec<u8> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        let payload = serde_json::json!({
            "version": 2,
            "entries": entries,
        });
        let mut out = INDEX_MAGIC.to_vec();
        out.extend_from_slice(payload.to_string().as_bytes());
        out
    }

    /// Decode either physical payload behind the shared magic.
    pub fn decode(bytes: &[u8]) -> IndexResult<Self> {
        if bytes.len() < 8 || &bytes[..8] != INDEX_MAGIC {
            return Err(IndexError::Format("missing DIRC v2 magic".into()));
        }
        let payload = &bytes[8..];
        if payload.first() == Some(&b'{') {
            return Self::decode_json(payload);
        }
        // Native binary: SHA-1 widths first, then SHA-256.
        match Self::decode_binary(bytes, 20) {
            Ok(index) => Ok(index),
            Err(_) => Self::decode_binary(bytes, 32),
        }
    }

    fn decode_json(payload: &[u8]) -> IndexResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| IndexError::Format(format!("index JSON payload: {e}")))?;
        let raw_entries = value
            .get("entries")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut entries = Vec::new();
        for raw in raw_entries {
            let Some(obj) = raw.as_object() else { continue };
            let Some(path) = obj.get("path").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(oid) = obj
                .get("oid")
                .and_then(|v| v.as_str())
                .and_then(|s| ObjectId::from_hex(s).ok())
            else {
                continue;
            };
            let mode = obj
                .get("mode")
                .and_then(|v| v.as_u64())
                .map(|m| m as u32)
                .unwrap_or(DEFAULT_FILE_MODE);
            entries.push(IndexEntry {
                path: path.to_string(),
                oid,
                mode,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { version: 2, entries })
    }

    fn decode_binary(bytes: &[u8], hash_len: usize) -> IndexResult<Self> {
        let fixed = STAT_PREFIX + hash_len + 2; // stat prefix + OID + flags
        if bytes.len() < 12 {
            return Err(IndexError::Format("binary index shorter than header".into()));
        }
        let entry_count = u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let mut pos = 12usize;
        let mut entries = Vec::with_capacity(entry_count);

        for _ in 0..entry_count {
            let start = pos;
            if bytes.len() < start + fixed {
                return Err(IndexError::Format("binary entry truncated".into()));
            }
            let mode = u32::from_be_bytes(bytes[start + 24..start + 28].try_into().unwrap());
            let oid = ObjectId::from_raw(&bytes[start + STAT_PREFIX..start + STAT_PREFIX + hash_len])?;

            let name_start = start + fixed;
            let nul = bytes[name_start..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| IndexError::Format("entry path missing NUL".into()))?;
            let path = std::str::from_utf8(&bytes[name_start..name_start + nul])
                .map_err(|_| IndexError::Format("entry path is not UTF-8".into()))?
                .to_string();

            // Entry length is padded with NULs to an 8-byte multiple.
            let entry_len = (fixed + nul + 8) & !7;
            pos = start + entry_len;
            if pos > bytes.len() {
                return Err(IndexError::Format("entry padding overruns payload".into()));
            }

            entries.push(IndexEntry { path, oid, mode });
        }

        // Extensions: <sig:4><size:4><bytes>, then exactly the trailer.
        while bytes.len() - pos > hash_len {
            if bytes.len() < pos + 8 {
                return Err(IndexError::Format("extension header truncated".into()));
            }
            let size = u32::from_be_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
            pos += 8;
            if bytes.len() < pos + size {
                return Err(IndexError::Format("extension body truncated".into()));
            }
            pos += size;
        }
        if bytes.len() - pos != hash_len {
            return Err(IndexError::Format(format!(
                "trailer is {} bytes, expected {hash_len}",
                bytes.len() - pos
            )));
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(Self { version: 2, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: &str) -> ObjectId {
        ObjectId::from_hex(&fill.repeat(40)).unwrap()
    }

    /// Build a binary index the way Git lays it out on disk.
    fn encode_binary(entries: &[IndexEntry], hash_len: usize, extensions: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = INDEX_MAGIC.to_vec();
        out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for entry in entries {
            let start = out.len();
            out.extend_from_slice(&[0u8; 24]); // ctime/mtime/dev/ino
            out.extend_from_slice(&entry.mode.to_be_bytes());
            out.extend_from_slice(&[0u8; 12]); // uid/gid/size
            out.extend_from_slice(entry.oid.as_bytes());
            out.extend_from_slice(&(entry.path.len() as u16).to_be_bytes());
            out.extend_from_slice(entry.path.as_bytes());
            let fixed = STAT_PREFIX + hash_len + 2;
            let entry_len = (fixed + entry.path.len() + 8) & !7;
            out.resize(start + entry_len, 0);
        }
        for (sig, body) in extensions {
            out.extend_from_slice(*sig);
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            out.extend_from_slice(body);
        }
        out.extend_from_slice(&vec![0xaa; hash_len]); // fake trailer
        out
    }

    #[test]
    fn json_roundtrip() {
        let mut index = Index::default();
        index.upsert(IndexEntry {
            path: "a.txt".into(),
            oid: oid("a"),
            mode: 0o100644,
        });
        let encoded = index.encode();
        assert_eq!(&encoded[..8], INDEX_MAGIC);
        assert_eq!(encoded[8], b'{');
        let decoded = Index::decode(&encoded).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn empty_index_roundtrip() {
        let index = Index::default();
        let decoded = Index::decode(&index.encode()).unwrap();
        assert!(decoded.entries.is_empty());
        assert_eq!(decoded.version, 2);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let index = Index::load(&dir.path().join("index")).unwrap();
        assert_eq!(index, Index::default());
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index");
        let mut index = Index::default();
        index.upsert(IndexEntry {
            path: "z.txt".into(),
            oid: oid("b"),
            mode: 0o100644,
        });
        index.store(&path).unwrap();
        assert_eq!(Index::load(&path).unwrap(), index);
    }

    #[test]
    fn json_normalization_drops_malformed_entries() {
        let payload = serde_json::json!({
            "version": 2,
            "entries": [
                {"path": "keep.txt", "oid": "a".repeat(40)},
                {"oid": "b".repeat(40)},            // no path
                {"path": 42, "oid": "c".repeat(40)}, // non-string path
                "not-an-object",
                {"path": "no-oid.txt"},
            ],
        });
        let mut bytes = INDEX_MAGIC.to_vec();
        bytes.extend_from_slice(payload.to_string().as_bytes());
        let index = Index::decode(&bytes).unwrap();
        assert_eq!(index.entries.len(), 1);
        assert_eq!(index.entries[0].path, "keep.txt");
        assert_eq!(index.entries[0].mode, DEFAULT_FILE_MODE);
    }

    #[test]
    fn binary_sha1_decode() {
        let entries = vec![
            IndexEntry {
                path: "src/lib.rs".into(),
                oid: oid("1"),
                mode: 0o100644,
            },
            IndexEntry {
                path: "a.txt".into(),
                oid: oid("2"),
                mode: 0o100755,
            },
        ];
        let bytes = encode_binary(&entries, 20, &[]);
        let index = Index::decode(&bytes).unwrap();
        // Decoder sorts by path.
        assert_eq!(index.entries[0].path, "a.txt");
        assert_eq!(index.entries[0].mode, 0o100755);
        assert_eq!(index.entries[1].path, "src/lib.rs");
        assert_eq!(index.entries[1].oid, oid("1"));
    }

    #[test]
    fn binary_sha256_fallback() {
        let wide = ObjectId::from_hex(&"d".repeat(64)).unwrap();
        let entries = vec![IndexEntry {
            path: "wide.bin".into(),
            oid: wide,
            mode: 0o100644,
        }];
        let bytes = encode_binary(&entries, 32, &[]);
        let index = Index::decode(&bytes).unwrap();
        assert_eq!(index.entries[0].oid, wide);
    }

    #[test]
    fn binary_extensions_are_consumed() {
        let entries = vec![IndexEntry {
            path: "x".into(),
            oid: oid("e"),
            mode: 0o100644,
        }];
        let bytes = encode_binary(&entries, 20, &[(b"TREE", b"cached tree data".to_vec())]);
        let index = Index::decode(&bytes).unwrap();
        assert_eq!(index.entries.len(), 1);
    }

    #[test]
    fn binary_bad_trailer_rejected() {
        let entries = vec![IndexEntry {
            path: "x".into(),
            oid: oid("e"),
            mode: 0o100644,
        }];
        let mut bytes = encode_binary(&entries, 20, &[]);
        bytes.push(0); // trailer now 21 bytes for sha1, 21 != 32 for sha256
        let err = Index::decode(&bytes).unwrap_err();
        assert!(matches!(err, IndexError::Format(_)));
    }

    #[test]
    fn missing_magic_rejected() {
        let err = Index::decode(b"not an index").unwrap_err();
        assert!(matches!(err, IndexError::Format(_)));
    }

    #[test]
    fn upsert_keeps_order_and_replaces() {
        let mut index = Index::default();
        for name in ["m.txt", "a.txt", "z.txt"] {
            index.upsert(IndexEntry {
                path: name.into(),
                oid: oid("a"),
                mode: 0o100644,
            });
        }
        let paths: Vec<&str> = index.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "m.txt", "z.txt"]);

        index.upsert(IndexEntry {
            path: "m.txt".into(),
            oid: oid("b"),
            mode: 0o100644,
        });
        assert_eq!(index.entries.len(), 3);
        assert_eq!(index.get("m.txt").unwrap().oid, oid("b"));
    }

    #[test]
    fn remove_entry() {
        let mut index = Index::default();
        index.upsert(IndexEntry {
            path: "a".into(),
            oid: oid("a"),
            mode: 0o100644,
        });
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert!(index.entries.is_empty());
    }
}
