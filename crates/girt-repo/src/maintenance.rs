//! Maintenance: reachability enumeration and the gated prune pass.
//!
//! Reachability walks every ref (plus HEAD) across commit parents and
//! tree entries. Objects outside the reachable set are reported;
//! deleting them additionally requires both the `prune` flag and the
//! `force_gate` acknowledgement, so a misconfigured call can never
//! silently destroy objects.

use std::collections::HashSet;

use girt_odb::{parse_commit, parse_tree, TreeEntryKind};
use girt_state::{files, store_state, MaintenanceReport};
use girt_types::{ObjectId, ObjectKind};

use crate::error::RepoResult;
use crate::ports::ProgressEvent;
use crate::repo::Repo;
use crate::ProgressCallback;

/// Options for `run_maintenance`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaintenanceOptions {
    /// Request deletion of unreachable loose objects.
    pub prune: bool,
    /// Second key for the prune pass; without it, prune only reports.
    pub force_gate: bool,
}

impl Repo {
    /// Enumerate reachability, verify pack sidecars, and (doubly
    /// gated) prune unreachable loose objects. The report is persisted
    /// to the maintenance sidecar and returned.
    pub fn run_maintenance(
        &self,
        options: &MaintenanceOptions,
        progress: Option<ProgressCallback>,
    ) -> RepoResult<MaintenanceReport> {
        let mut reachable_refs: Vec<String> = Vec::new();
        let mut roots: Vec<ObjectId> = Vec::new();

        for (name, oid) in self.refs().list_refs("refs")? {
            reachable_refs.push(name);
            roots.push(oid);
        }
        if let Ok(head) = self.refs().resolve_head() {
            reachable_refs.push("HEAD".to_string());
            roots.push(head);
        }

        let reachable = self.reachable_objects(&roots)?;
        let mut reachable_sorted: Vec<ObjectId> = reachable.iter().copied().collect();
        reachable_sorted.sort();

        let loose = self.odb().loose_oids()?;
        let unreachable: Vec<ObjectId> = loose
            .iter()
            .filter(|oid| !reachable.contains(oid))
            .copied()
            .collect();

        if let Some(cb) = progress {
            cb(&ProgressEvent {
                phase: "maintenance".into(),
                transferred: reachable_sorted.len() as u64,
                total: Some(loose.len() as u64),
                message: Some(format!("{} unreachable", unreachable.len())),
            });
        }

        let mut pruned = Vec::new();
        if options.prune && options.force_gate {
            for oid in &unreachable {
                if self.odb().delete_loose(oid)? {
                    pruned.push(*oid);
                }
            }
            tracing::warn!(count = pruned.len(), "pruned unreachable loose objects");
        }

        let report = MaintenanceReport {
            reachable_refs,
            reachable_objects: reachable_sorted,
            unreachable_objects: unreachable,
            pruned_objects: pruned,
            verified_sidecars: self.odb().verify_pack_sidecars()?,
        };
        store_state(&self.state_path(files::MAINTENANCE), &report)?;
        Ok(report)
    }

    /// Walk commit parents and tree entries from the roots. Objects
    /// missing from the store (shallow history, promised blobs) are
    /// tolerated and simply not expanded.
    fn reachable_objects(&self, roots: &[ObjectId]) -> RepoResult<HashSet<ObjectId>> {
        let mut reachable = HashSet::new();
        let mut queue: Vec<ObjectId> = roots.to_vec();

        while let Some(oid) = queue.pop() {
            if !reachable.insert(oid) {
                continue;
            }
            let envelope = match self.odb().read_envelope(&oid) {
                Ok(env) => env,
                Err(girt_odb::OdbError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            match envelope.kind {
                ObjectKind::Commit => {
                    let info = parse_commit(&envelope.payload)?;
                    queue.push(info.tree);
                    queue.extend(info.parents);
                }
                ObjectKind::Tree => {
                    for entry in parse_tree(&envelope.payload, self.algorithm())? {
                        if entry.kind() != TreeEntryKind::Gitlink {
                            queue.push(entry.oid);
                        }
                    }
                }
                ObjectKind::Blob | ObjectKind::Tag => {}
            }
        }
        Ok(reachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::InitOptions;
    use girt_odb::{build_tree, TreeEntry};
    use tempfile::TempDir;

    fn make_repo() -> (TempDir, Repo) {
        let dir = TempDir::new().unwrap();
        let repo = Repo::init(dir.path(), InitOptions::default()).unwrap();
        (dir, repo)
    }

    fn seed(repo: &Repo) -> (ObjectId, ObjectId) {
        let blob = repo.write_blob(b"kept").unwrap();
        let tree = repo
            .write_object(
                girt_types::ObjectKind::Tree,
                &build_tree(vec![TreeEntry {
                    mode: 0o100644,
                    name: "kept.txt".into(),
                    oid: blob,
                }]),
            )
            .unwrap();
        let commit = repo
            .write_object(
                girt_types::ObjectKind::Commit,
                format!("tree {tree}\n\nmsg\n").as_bytes(),
            )
            .unwrap();
        repo.update_ref("refs/heads/main", &commit, "init").unwrap();
        (commit, blob)
    }

    #[test]
    fn report_partitions_reachable_and_not() {
        let (_dir, repo) = make_repo();
        let (commit, blob) = seed(&repo);
        let orphan = repo.write_blob(b"orphan").unwrap();

        let report = repo
            .run_maintenance(&MaintenanceOptions::default(), None)
            .unwrap();
        assert!(report.reachable_refs.contains(&"refs/heads/main".to_string()));
        assert!(report.reachable_refs.contains(&"HEAD".to_string()));
        assert!(report.reachable_objects.contains(&commit));
        assert!(report.reachable_objects.contains(&blob));
        assert_eq!(report.unreachable_objects, vec![orphan]);
        assert!(report.pruned_objects.is_empty());
        // Nothing deleted without the gate.
        assert!(repo.odb().contains(&orphan));
    }

    #[test]
    fn prune_requires_both_gates() {
        let (_dir, repo) = make_repo();
        seed(&repo);
        let orphan = repo.write_blob(b"orphan").unwrap();

        // prune without the gate: report only.
        let report = repo
            .run_maintenance(
                &MaintenanceOptions {
                    prune: true,
                    force_gate: false,
                },
                None,
            )
            .unwrap();
        assert!(report.pruned_objects.is_empty());
        assert!(repo.odb().contains(&orphan));

        // Both keys: the orphan goes, reachable objects stay.
        let report = repo
            .run_maintenance(
                &MaintenanceOptions {
                    prune: true,
                    force_gate: true,
                },
                None,
            )
            .unwrap();
        assert_eq!(report.pruned_objects, vec![orphan]);
        assert!(!repo.odb().contains(&orphan));
        for oid in &report.reachable_objects {
            assert!(repo.odb().contains(oid));
        }
    }

    #[test]
    fn report_is_persisted() {
        let (_dir, repo) = make_repo();
        seed(&repo);
        repo.run_maintenance(&MaintenanceOptions::default(), None)
            .unwrap();
        let loaded: MaintenanceReport =
            girt_state::load_state(&repo.state_path(files::MAINTENANCE)).unwrap();
        assert!(!loaded.reachable_objects.is_empty());
    }

    #[test]
    fn missing_objects_tolerated() {
        let (_dir, repo) = make_repo();
        // A ref pointing at an object we never stored (shallow-like).
        let ghost = ObjectId::from_hex(&"9".repeat(40)).unwrap();
        repo.update_ref("refs/heads/ghost", &ghost, "init").unwrap();
        let report = repo
            .run_maintenance(&MaintenanceOptions::default(), None)
            .unwrap();
        assert!(report.reachable_objects.contains(&ghost));
    }
}
