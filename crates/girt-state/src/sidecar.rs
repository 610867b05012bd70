//! The remaining sidecar families: stash, remotes, submodules,
//! worktrees, sparse checkout, maintenance, notes, replace.
//!
//! Each is a plain serde schema; the repository facade owns the CRUD
//! and calls `load_state`/`store_state` around every mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use girt_pathspec::SparseMode;
use girt_types::ObjectId;

// ---- Stash ----

/// One stashed snapshot: staged file OIDs keyed by path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    pub message: String,
    pub files: BTreeMap<String, ObjectId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashState {
    /// Newest entry last; `pop` takes from the back.
    pub entries: Vec<StashEntry>,
}

// ---- Remotes ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub fetch: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotesState {
    pub remotes: BTreeMap<String, RemoteConfig>,
}

// ---- Submodules ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleConfig {
    pub path: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodulesState {
    pub submodules: BTreeMap<String, SubmoduleConfig>,
}

// ---- Worktrees ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub path: String,
    pub head: Option<ObjectId>,
    pub prunable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreesState {
    pub worktrees: Vec<WorktreeEntry>,
}

impl WorktreesState {
    pub fn find_mut(&mut self, path: &str) -> Option<&mut WorktreeEntry> {
        self.worktrees.iter_mut().find(|w| w.path == path)
    }

    /// Drop every entry flagged prunable; returns the removed paths.
    pub fn prune(&mut self) -> Vec<String> {
        let (pruned, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.worktrees).into_iter().partition(|w| w.prunable);
        self.worktrees = kept;
        pruned.into_iter().map(|w| w.path).collect()
    }
}

// ---- Sparse checkout ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseState {
    pub mode: SparseMode,
    pub rules: Vec<String>,
}

// ---- Maintenance ----

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub reachable_refs: Vec<String>,
    pub reachable_objects: Vec<ObjectId>,
    pub unreachable_objects: Vec<ObjectId>,
    /// Loose objects actually deleted by the gated prune pass.
    pub pruned_objects: Vec<ObjectId>,
    pub verified_sidecars: Vec<String>,
}

// ---- Notes ----

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesState {
    /// Note text keyed by target OID.
    pub notes: BTreeMap<String, String>,
}

// ---- Replace ----

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceState {
    /// Replacement target keyed by the replaced OID.
    pub replacements: BTreeMap<String, ObjectId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: &str) -> ObjectId {
        ObjectId::from_hex(&fill.repeat(40)).unwrap()
    }

    #[test]
    fn stash_is_a_stack() {
        let mut stash = StashState::default();
        stash.entries.push(StashEntry {
            message: "first".into(),
            files: BTreeMap::new(),
        });
        stash.entries.push(StashEntry {
            message: "second".into(),
            files: BTreeMap::new(),
        });
        assert_eq!(stash.entries.pop().unwrap().message, "second");
        assert_eq!(stash.entries.pop().unwrap().message, "first");
    }

    #[test]
    fn worktree_prune_removes_flagged_only() {
        let mut state = WorktreesState {
            worktrees: vec![
                WorktreeEntry {
                    path: "wt/a".into(),
                    head: Some(oid("a")),
                    prunable: false,
                },
                WorktreeEntry {
                    path: "wt/b".into(),
                    head: None,
                    prunable: true,
                },
            ],
        };
        let pruned = state.prune();
        assert_eq!(pruned, vec!["wt/b"]);
        assert_eq!(state.worktrees.len(), 1);
        assert_eq!(state.worktrees[0].path, "wt/a");
    }

    #[test]
    fn worktree_find_and_flag() {
        let mut state = WorktreesState {
            worktrees: vec![WorktreeEntry {
                path: "wt/x".into(),
                head: None,
                prunable: false,
            }],
        };
        state.find_mut("wt/x").unwrap().prunable = true;
        assert!(state.worktrees[0].prunable);
        assert!(state.find_mut("wt/missing").is_none());
    }

    #[test]
    fn sparse_state_roundtrip() {
        let state = SparseState {
            mode: SparseMode::Cone,
            rules: vec!["src".into(), "docs".into()],
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"cone\""));
        let back: SparseState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn notes_and_replace_maps() {
        let mut notes = NotesState::default();
        notes.notes.insert(oid("a").to_hex(), "reviewed".into());
        let json = serde_json::to_string(&notes).unwrap();
        let back: NotesState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, notes);

        let mut replace = ReplaceState::default();
        replace.replacements.insert(oid("b").to_hex(), oid("c"));
        let json = serde_json::to_string(&replace).unwrap();
        let back: ReplaceState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, replace);
    }
}
