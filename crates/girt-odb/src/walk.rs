//! Graph walks over stored objects: tree materialization and the
//! shallow-clone boundary.
//!
//! Both walks use explicit work lists and visited sets; neither relies
//! on host recursion, so arbitrarily deep trees and histories are safe.

use std::collections::{BTreeMap, HashSet, VecDeque};

use girt_types::ObjectId;

use crate::commit::parse_commit;
use crate::error::OdbResult;
use crate::store::ObjectDb;
use crate::tree::{parse_tree, TreeEntryKind};

/// A submodule pointer found during materialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gitlink {
    pub path: String,
    pub oid: ObjectId,
}

/// A fully expanded tree: file contents keyed by worktree-relative
/// path, plus the gitlinks encountered (recorded, never recursed into).
#[derive(Clone, Debug, Default)]
pub struct MaterializedTree {
    pub files: BTreeMap<String, Vec<u8>>,
    pub gitlinks: Vec<Gitlink>,
}

/// Recursively expand a tree into file contents.
pub fn materialize_tree(db: &ObjectDb, root: &ObjectId) -> OdbResult<MaterializedTree> {
    let mut result = MaterializedTree::default();
    let mut stack: Vec<(String, ObjectId)> = vec![(String::new(), *root)];

    while let Some((prefix, tree_oid)) = stack.pop() {
        let payload = db.read_object(&tree_oid)?;
        for entry in parse_tree(&payload, db.algorithm())? {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };
            match entry.kind() {
                TreeEntryKind::Directory => stack.push((path, entry.oid)),
                TreeEntryKind::Gitlink => result.gitlinks.push(Gitlink {
                    path,
                    oid: entry.oid,
                }),
                TreeEntryKind::File => {
                    result.files.insert(path, db.read_object(&entry.oid)?);
                }
            }
        }
    }

    result.gitlinks.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

/// Compute the shallow boundary: the commits at BFS level `depth` from
/// `head` over parent links (level 1 is the head itself), or the
/// deepest reachable level when history is shorter. Output is
/// lex-sorted by hex.
pub fn shallow_boundary(db: &ObjectDb, head: &ObjectId, depth: usize) -> OdbResult<Vec<ObjectId>> {
    debug_assert!(depth >= 1);
    let mut seen: HashSet<ObjectId> = HashSet::new();
    seen.insert(*head);
    let mut level: Vec<ObjectId> = vec![*head];

    for _ in 1..depth {
        let mut next: VecDeque<ObjectId> = VecDeque::new();
        for oid in &level {
            let info = parse_commit(&db.read_object(oid)?)?;
            for parent in info.parents {
                if seen.insert(parent) {
                    next.push_back(parent);
                }
            }
        }
        if next.is_empty() {
            break; // history ran out; current level is the boundary
        }
        level = next.into_iter().collect();
    }

    level.sort();
    Ok(level)
}
