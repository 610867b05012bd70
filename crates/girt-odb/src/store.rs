//! The filesystem-backed loose object store.

use std::fs;
use std::path::{Path, PathBuf};

use girt_types::{HashAlgorithm, ObjectId, ObjectKind};

use crate::compress::{deflate_raw, inflate_raw, InflateLimits};
use crate::error::{OdbError, OdbResult};
use crate::loose::{decode_loose, encode_loose, LooseObject};

/// A decoded object together with its on-disk footprint.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub kind: ObjectKind,
    pub payload: Vec<u8>,
    /// Compressed size of the loose file on disk.
    pub disk_size: u64,
}

/// Content-addressed loose storage rooted at an `objects/` directory.
///
/// Objects are immutable once written; a second write of the same
/// content is skipped, never overwritten. Concurrent readers are always
/// safe. The store owns the on-disk objects exclusively.
pub struct ObjectDb {
    objects_dir: PathBuf,
    algo: HashAlgorithm,
}

impl ObjectDb {
    pub fn new(objects_dir: impl Into<PathBuf>, algo: HashAlgorithm) -> Self {
        Self {
            objects_dir: objects_dir.into(),
            algo,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Sharded path for an OID: `objects/<oid[0:2]>/<oid[2:]>`.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        let hex = oid.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Hash, frame, compress and store a payload. Idempotent: if the
    /// object already exists on disk the write is skipped.
    pub fn write_loose(&self, kind: ObjectKind, payload: &[u8]) -> OdbResult<ObjectId> {
        let oid = girt_hash::hash_object(kind, payload, self.algo);
        let path = self.object_path(&oid);
        if path.exists() {
            return Ok(oid);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let compressed = deflate_raw(&encode_loose(kind, payload))?;
        fs::write(&path, compressed)?;
        Ok(oid)
    }

    /// Store a payload under a caller-supplied OID without rehashing.
    ///
    /// For promisor backfill, where the OID comes from the trusted
    /// promisor table and the bytes are reused as-is. Idempotent like
    /// `write_loose`.
    pub fn write_loose_at(
        &self,
        oid: &ObjectId,
        kind: ObjectKind,
        payload: &[u8],
    ) -> OdbResult<()> {
        let path = self.object_path(oid);
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let compressed = deflate_raw(&encode_loose(kind, payload))?;
        fs::write(&path, compressed)?;
        Ok(())
    }

    /// Returns `true` if a loose object exists for `oid`.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).exists()
    }

    /// Read an object's payload, inflating under the default limits.
    pub fn read_object(&self, oid: &ObjectId) -> OdbResult<Vec<u8>> {
        Ok(self.read_loose(oid)?.payload)
    }

    /// Read an object with its kind and on-disk size, for statistics.
    pub fn read_envelope(&self, oid: &ObjectId) -> OdbResult<Envelope> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OdbError::NotFound(*oid))
            }
            Err(e) => return Err(e.into()),
        };
        let disk_size = compressed.len() as u64;
        let decoded = decode_loose(&inflate_raw(&compressed, InflateLimits::default())?)?;
        Ok(Envelope {
            kind: decoded.kind,
            payload: decoded.payload,
            disk_size,
        })
    }

    fn read_loose(&self, oid: &ObjectId) -> OdbResult<LooseObject> {
        let env = self.read_envelope(oid)?;
        Ok(LooseObject {
            kind: env.kind,
            payload: env.payload,
        })
    }

    /// Enumerate every loose OID, lexicographically sorted.
    pub fn loose_oids(&self) -> OdbResult<Vec<ObjectId>> {
        let mut oids = Vec::new();
        let entries = match fs::read_dir(&self.objects_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(oids),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let shard = entry.file_name().to_string_lossy().into_owned();
            if shard.len() != 2 || !entry.file_type()?.is_dir() {
                continue;
            }
            for file in fs::read_dir(entry.path())? {
                let file = file?;
                let rest = file.file_name().to_string_lossy().into_owned();
                if let Ok(oid) = ObjectId::from_hex(&format!("{shard}{rest}")) {
                    oids.push(oid);
                }
            }
        }
        oids.sort();
        Ok(oids)
    }

    /// Remove a loose object. Returns `true` if it existed.
    ///
    /// Only the maintenance prune pass calls this; deleting a
    /// reachable object corrupts the repository.
    pub fn delete_loose(&self, oid: &ObjectId) -> OdbResult<bool> {
        let path = self.object_path(oid);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
