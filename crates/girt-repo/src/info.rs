//! Repository reports: object statistics and layout structure.

use std::collections::BTreeMap;

use serde::Serialize;

use girt_refs::Head;
use girt_types::ObjectKind;

use crate::error::RepoResult;
use crate::repo::Repo;

/// Counts and on-disk sizes, by object type.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ObjectStats {
    pub count: u64,
    pub disk_size: u64,
}

/// Summary statistics for a repository.
#[derive(Clone, Debug, Serialize)]
pub struct RepoInfo {
    pub hash_algorithm: String,
    pub head: String,
    pub ref_count: usize,
    pub objects: BTreeMap<String, ObjectStats>,
}

/// Presence map of the canonical layout.
#[derive(Clone, Debug, Serialize)]
pub struct RepoStructure {
    pub entries: BTreeMap<String, bool>,
}

impl Repo {
    /// Object counts/sizes (via envelopes), ref count and HEAD state.
    pub fn info(&self) -> RepoResult<RepoInfo> {
        let mut objects: BTreeMap<String, ObjectStats> = BTreeMap::new();
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Tree,
            ObjectKind::Commit,
            ObjectKind::Tag,
        ] {
            objects.insert(kind.as_str().to_string(), ObjectStats::default());
        }
        for oid in self.odb().loose_oids()? {
            let envelope = self.odb().read_envelope(&oid)?;
            let stats = objects
                .get_mut(envelope.kind.as_str())
                .expect("all kinds pre-seeded");
            stats.count += 1;
            stats.disk_size += envelope.disk_size;
        }

        let head = match self.refs().read_head() {
            Ok(Head::Symbolic(target)) => format!("ref: {target}"),
            Ok(Head::Detached(oid)) => format!("detached: {oid}"),
            Err(_) => "unset".to_string(),
        };

        Ok(RepoInfo {
            hash_algorithm: self.algorithm().to_string(),
            head,
            ref_count: self.refs().list_refs("refs")?.len(),
            objects,
        })
    }

    /// Which pieces of the canonical layout exist on disk.
    pub fn structure(&self) -> RepoResult<RepoStructure> {
        let mut entries = BTreeMap::new();
        for path in [
            "HEAD",
            "config",
            "description",
            "index",
            "packed-refs",
            "shallow",
            "refs/heads",
            "refs/tags",
            "refs/remotes",
            "objects/info",
            "objects/pack",
            "objects/info/commit-graph",
            "objects/pack/multi-pack-index",
            "info/sparse-checkout",
            "logs",
        ] {
            entries.insert(path.to_string(), self.git_dir().join(path).exists());
        }
        Ok(RepoStructure { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::InitOptions;
    use tempfile::TempDir;

    #[test]
    fn info_counts_by_type() {
        let dir = TempDir::new().unwrap();
        let repo = Repo::init(dir.path(), InitOptions::default()).unwrap();
        repo.write_blob(b"one").unwrap();
        repo.write_blob(b"two").unwrap();
        repo.write_object(ObjectKind::Tree, b"").unwrap();

        let info = repo.info().unwrap();
        assert_eq!(info.objects["blob"].count, 2);
        assert_eq!(info.objects["tree"].count, 1);
        assert_eq!(info.objects["commit"].count, 0);
        assert!(info.objects["blob"].disk_size > 0);
        assert_eq!(info.hash_algorithm, "sha1");
        assert_eq!(info.head, "ref: refs/heads/main");
    }

    #[test]
    fn structure_reflects_disk() {
        let dir = TempDir::new().unwrap();
        let repo = Repo::init(dir.path(), InitOptions::default()).unwrap();
        let structure = repo.structure().unwrap();
        assert!(structure.entries["HEAD"]);
        assert!(structure.entries["objects/pack"]);
        assert!(!structure.entries["packed-refs"]);
        assert!(!structure.entries["shallow"]);
    }
}
