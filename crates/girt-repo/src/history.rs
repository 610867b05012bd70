//! History helpers: resolving a revision spec and finding the commit
//! that last changed a path.

use girt_odb::{parse_commit, parse_tree, TreeEntryKind};
use girt_types::ObjectId;

use crate::error::{RepoError, RepoResult};
use crate::repo::Repo;

/// The answer to "when did this path last change": the change-point
/// commit in history plus the currently staged blob, either of which
/// may be absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastModified {
    pub history: Option<ObjectId>,
    pub staged: Option<ObjectId>,
}

impl Repo {
    /// Resolve a revision spec: `HEAD`, a raw OID, `refs/<X>`, or a
    /// short name tried under `refs/`, `refs/heads/`, `refs/tags/`.
    pub fn resolve_revision(&self, spec: &str) -> RepoResult<ObjectId> {
        if spec == "HEAD" {
            return self.resolve_head();
        }
        if let Ok(oid) = ObjectId::from_hex(spec) {
            return Ok(oid);
        }
        for candidate in [
            spec.to_string(),
            format!("refs/{spec}"),
            format!("refs/heads/{spec}"),
            format!("refs/tags/{spec}"),
        ] {
            if let Some(oid) = self.refs().resolve_ref(&candidate)? {
                return Ok(oid);
            }
        }
        Err(RepoError::NotFound(format!("revision {spec:?}")))
    }

    /// Find the commit where `path` last changed, walking first
    /// parents from `spec` (HEAD when absent), plus the staged OID.
    ///
    /// At each commit the path's blob is compared against every
    /// parent: any difference (or absence in some parent) makes this
    /// commit the change point.
    pub fn last_modified(&self, path: &str, spec: Option<&str>) -> RepoResult<LastModified> {
        let start = self.resolve_revision(spec.unwrap_or("HEAD"))?;

        let mut seen = std::collections::HashSet::new();
        let mut current = start;
        let mut history = None;

        while seen.insert(current) {
            let info = parse_commit(&self.odb().read_object(&current)?)?;
            let here = self.path_oid_in_tree(&info.tree, path)?;

            if info.parents.is_empty() {
                history = here.map(|_| current);
                break;
            }

            let mut changed = false;
            for parent in &info.parents {
                let parent_info = parse_commit(&self.odb().read_object(parent)?)?;
                let there = self.path_oid_in_tree(&parent_info.tree, path)?;
                if there != here {
                    changed = true;
                    break;
                }
            }

            if changed {
                history = here.map(|_| current);
                break;
            }
            current = info.parents[0];
        }

        let staged = self.read_index()?.get(path).map(|e| e.oid);
        Ok(LastModified { history, staged })
    }

    /// Walk a path segment-by-segment through a tree. Any gitlink or
    /// missing component mid-path aborts to `None`.
    fn path_oid_in_tree(&self, tree: &ObjectId, path: &str) -> RepoResult<Option<ObjectId>> {
        let mut current = *tree;
        let segments: Vec<&str> = path.split('/').collect();
        for (i, segment) in segments.iter().enumerate() {
            let entries = parse_tree(&self.odb().read_object(&current)?, self.algorithm())?;
            let Some(entry) = entries.iter().find(|e| e.name == *segment) else {
                return Ok(None);
            };
            let last = i == segments.len() - 1;
            match entry.kind() {
                TreeEntryKind::Gitlink => return Ok(None),
                TreeEntryKind::Directory if !last => current = entry.oid,
                TreeEntryKind::Directory => return Ok(Some(entry.oid)),
                TreeEntryKind::File if last => return Ok(Some(entry.oid)),
                TreeEntryKind::File => return Ok(None),
            }
        }
        Ok(None)
    }
}
