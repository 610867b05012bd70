//! Opaque pack-side containers.
//!
//! Packs, bitmaps, the multi-pack-index and the commit-graph are
//! written and read back as byte containers. Only names and magic
//! bytes are checked; the wire formats are never decoded, and object
//! lookup falls through to the loose store.

use std::fs;
use std::path::PathBuf;

use girt_types::ObjectId;

use crate::error::{OdbError, OdbResult};
use crate::store::ObjectDb;

const BITMAP_MAGIC: &[u8; 4] = b"BITM";
const MIDX_MAGIC: &[u8; 4] = b"MIDX";
const COMMIT_GRAPH_MAGIC: &[u8; 4] = b"CGPH";

/// Check a pack base name: `pack-<40-or-64 lowercase hex>`.
pub fn validate_pack_name(name: &str) -> OdbResult<()> {
    let hex = name.strip_prefix("pack-").ok_or_else(|| {
        OdbError::PackFormat(format!("pack name must start with 'pack-': {name:?}"))
    })?;
    let hex_ok = (hex.len() == 40 || hex.len() == 64)
        && hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !hex_ok {
        return Err(OdbError::PackFormat(format!(
            "pack name is not pack-<lowercase hex oid>: {name:?}"
        )));
    }
    Ok(())
}

impl ObjectDb {
    fn pack_dir(&self) -> PathBuf {
        self.objects_dir().join("pack")
    }

    fn info_dir(&self) -> PathBuf {
        self.objects_dir().join("info")
    }

    /// Store a `.pack`/`.idx` pair under `objects/pack/`.
    pub fn write_pack_bundle(&self, name: &str, pack: &[u8], idx: &[u8]) -> OdbResult<()> {
        validate_pack_name(name)?;
        let dir = self.pack_dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.pack")), pack)?;
        fs::write(dir.join(format!("{name}.idx")), idx)?;
        Ok(())
    }

    /// Look up an object "via" a pack: both bundle halves must exist,
    /// then the lookup falls through to the loose store.
    pub fn read_object_from_pack(&self, oid: &ObjectId, name: &str) -> OdbResult<Vec<u8>> {
        validate_pack_name(name)?;
        let dir = self.pack_dir();
        for ext in ["pack", "idx"] {
            let path = dir.join(format!("{name}.{ext}"));
            if !path.exists() {
                return Err(OdbError::PackFormat(format!(
                    "pack bundle incomplete: missing {name}.{ext}"
                )));
            }
        }
        self.read_object(oid)
    }

    /// Store a pack bitmap; the container must open with `BITM`.
    pub fn write_bitmap(&self, name: &str, bytes: &[u8]) -> OdbResult<()> {
        validate_pack_name(name)?;
        check_magic(bytes, BITMAP_MAGIC, "bitmap")?;
        let dir = self.pack_dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.bitmap")), bytes)?;
        Ok(())
    }

    /// Store the multi-pack-index; must open with `MIDX`.
    pub fn write_multi_pack_index(&self, bytes: &[u8]) -> OdbResult<()> {
        check_magic(bytes, MIDX_MAGIC, "multi-pack-index")?;
        let dir = self.pack_dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("multi-pack-index"), bytes)?;
        Ok(())
    }

    /// Store the commit-graph; must open with `CGPH`.
    pub fn write_commit_graph(&self, bytes: &[u8]) -> OdbResult<()> {
        check_magic(bytes, COMMIT_GRAPH_MAGIC, "commit-graph")?;
        let dir = self.info_dir();
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("commit-graph"), bytes)?;
        Ok(())
    }

    /// Re-read a stored container and re-check its magic. Used by
    /// maintenance verification.
    pub fn verify_pack_sidecars(&self) -> OdbResult<Vec<String>> {
        let mut verified = Vec::new();
        let midx = self.pack_dir().join("multi-pack-index");
        if midx.exists() {
            check_magic(&fs::read(&midx)?, MIDX_MAGIC, "multi-pack-index")?;
            verified.push("multi-pack-index".to_string());
        }
        let graph = self.info_dir().join("commit-graph");
        if graph.exists() {
            check_magic(&fs::read(&graph)?, COMMIT_GRAPH_MAGIC, "commit-graph")?;
            verified.push("commit-graph".to_string());
        }
        let pack_dir = self.pack_dir();
        if pack_dir.exists() {
            let mut bitmaps = Vec::new();
            for entry in fs::read_dir(&pack_dir)? {
                let entry = entry?;
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if file_name.ends_with(".bitmap") {
                    check_magic(&fs::read(entry.path())?, BITMAP_MAGIC, "bitmap")?;
                    bitmaps.push(file_name);
                }
            }
            bitmaps.sort();
            verified.extend(bitmaps);
        }
        Ok(verified)
    }
}

fn check_magic(bytes: &[u8], magic: &[u8; 4], what: &str) -> OdbResult<()> {
    if bytes.len() < 4 || &bytes[..4] != magic {
        return Err(OdbError::PackFormat(format!(
            "{what} container missing {} magic",
            String::from_utf8_lossy(magic)
        )));
    }
    Ok(())
}
