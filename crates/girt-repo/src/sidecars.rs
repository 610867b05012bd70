//! CRUD over the remaining sidecar families: stash, remotes,
//! submodules, worktrees, notes, replace.

use std::collections::BTreeMap;

use girt_state::{
    files, load_state, store_state, NotesState, RemoteConfig, RemotesState, ReplaceState,
    StashEntry, StashState, SubmoduleConfig, SubmodulesState, WorktreeEntry, WorktreesState,
};
use girt_types::{ensure_safe_path, ObjectId};

use crate::error::{RepoError, RepoResult};
use crate::repo::Repo;

impl Repo {
    // ---- Stash ----

    /// Snapshot the staged entries under a message.
    pub fn stash_push(&self, message: &str) -> RepoResult<()> {
        let index = self.read_index()?;
        let files_map: BTreeMap<String, ObjectId> = index
            .entries
            .iter()
            .map(|e| (e.path.clone(), e.oid))
            .collect();
        let path = self.state_path(files::STASH);
        let mut stash: StashState = load_state(&path)?;
        stash.entries.push(StashEntry {
            message: message.to_string(),
            files: files_map,
        });
        Ok(store_state(&path, &stash)?)
    }

    pub fn stash_list(&self) -> RepoResult<Vec<StashEntry>> {
        let stash: StashState = load_state(&self.state_path(files::STASH))?;
        Ok(stash.entries)
    }

    /// Pop the newest stash entry and restore its files to the
    /// worktree.
    pub fn stash_pop(&self) -> RepoResult<StashEntry> {
        let path = self.state_path(files::STASH);
        let mut stash: StashState = load_state(&path)?;
        let entry = stash
            .entries
            .pop()
            .ok_or_else(|| RepoError::NotFound("stash is empty".into()))?;
        let mut checkout_files = Vec::new();
        for (rel_path, oid) in &entry.files {
            checkout_files.push((rel_path.clone(), self.read_object(oid)?));
        }
        self.checkout(&checkout_files)?;
        store_state(&path, &stash)?;
        Ok(entry)
    }

    // ---- Remotes ----

    pub fn remote_add(&self, name: &str, url: &str) -> RepoResult<()> {
        let path = self.state_path(files::REMOTES);
        let mut state: RemotesState = load_state(&path)?;
        if state.remotes.contains_key(name) {
            return Err(RepoError::AlreadyExists(format!("remote {name:?}")));
        }
        state.remotes.insert(
            name.to_string(),
            RemoteConfig {
                url: url.to_string(),
                fetch: format!("+refs/heads/*:refs/remotes/{name}/*"),
            },
        );
        Ok(store_state(&path, &state)?)
    }

    pub fn remote_remove(&self, name: &str) -> RepoResult<()> {
        let path = self.state_path(files::REMOTES);
        let mut state: RemotesState = load_state(&path)?;
        if state.remotes.remove(name).is_none() {
            return Err(RepoError::NotFound(format!("remote {name:?}")));
        }
        Ok(store_state(&path, &state)?)
    }

    pub fn remote_list(&self) -> RepoResult<BTreeMap<String, RemoteConfig>> {
        let state: RemotesState = load_state(&self.state_path(files::REMOTES))?;
        Ok(state.remotes)
    }

    // ---- Submodules ----

    pub fn submodule_register(&self, name: &str, path: &str, url: &str) -> RepoResult<()> {
        ensure_safe_path(path)?;
        let file = self.state_path(files::SUBMODULES);
        let mut state: SubmodulesState = load_state(&file)?;
        state.submodules.insert(
            name.to_string(),
            SubmoduleConfig {
                path: path.to_string(),
                url: url.to_string(),
            },
        );
        Ok(store_state(&file, &state)?)
    }

    pub fn submodule_remove(&self, name: &str) -> RepoResult<()> {
        let file = self.state_path(files::SUBMODULES);
        let mut state: SubmodulesState = load_state(&file)?;
        if state.submodules.remove(name).is_none() {
            return Err(RepoError::NotFound(format!("submodule {name:?}")));
        }
        Ok(store_state(&file, &state)?)
    }

    pub fn submodule_list(&self) -> RepoResult<BTreeMap<String, SubmoduleConfig>> {
        let state: SubmodulesState = load_state(&self.state_path(files::SUBMODULES))?;
        Ok(state.submodules)
    }

    // ---- Worktrees ----

    pub fn worktree_add(&self, path: &str, head: Option<ObjectId>) -> RepoResult<()> {
        ensure_safe_path(path)?;
        let file = self.state_path(files::WORKTREES);
        let mut state: WorktreesState = load_state(&file)?;
        if state.worktrees.iter().any(|w| w.path == path) {
            return Err(RepoError::AlreadyExists(format!("worktree {path:?}")));
        }
        state.worktrees.push(WorktreeEntry {
            path: path.to_string(),
            head,
            prunable: false,
        });
        Ok(store_state(&file, &state)?)
    }

    pub fn worktree_list(&self) -> RepoResult<Vec<WorktreeEntry>> {
        let state: WorktreesState = load_state(&self.state_path(files::WORKTREES))?;
        Ok(state.worktrees)
    }

    /// Toggle the prunable flag on a linked worktree.
    pub fn mark_worktree_prunable(&self, path: &str, prunable: bool) -> RepoResult<()> {
        let file = self.state_path(files::WORKTREES);
        let mut state: WorktreesState = load_state(&file)?;
        let entry = state
            .find_mut(path)
            .ok_or_else(|| RepoError::NotFound(format!("worktree {path:?}")))?;
        entry.prunable = prunable;
        Ok(store_state(&file, &state)?)
    }

    /// Remove every flagged entry; returns the pruned paths.
    pub fn prune_worktrees(&self) -> RepoResult<Vec<String>> {
        let file = self.state_path(files::WORKTREES);
        let mut state: WorktreesState = load_state(&file)?;
        let pruned = state.prune();
        store_state(&file, &state)?;
        Ok(pruned)
    }

    // ---- Notes ----

    pub fn note_set(&self, target: &ObjectId, text: &str) -> RepoResult<()> {
        let file = self.state_path(files::NOTES);
        let mut state: NotesState = load_state(&file)?;
        state.notes.insert(target.to_hex(), text.to_string());
        Ok(store_state(&file, &state)?)
    }

    pub fn note_get(&self, target: &ObjectId) -> RepoResult<Option<String>> {
        let state: NotesState = load_state(&self.state_path(files::NOTES))?;
        Ok(state.notes.get(&target.to_hex()).cloned())
    }

    pub fn note_remove(&self, target: &ObjectId) -> RepoResult<()> {
        let file = self.state_path(files::NOTES);
        let mut state: NotesState = load_state(&file)?;
        if state.notes.remove(&target.to_hex()).is_none() {
            return Err(RepoError::NotFound(format!("note for {target}")));
        }
        Ok(store_state(&file, &state)?)
    }

    // ---- Replace ----

    pub fn replace_set(&self, original: &ObjectId, replacement: &ObjectId) -> RepoResult<()> {
        let file = self.state_path(files::REPLACE);
        let mut state: ReplaceState = load_state(&file)?;
        state.replacements.insert(original.to_hex(), *replacement);
        Ok(store_state(&file, &state)?)
    }

    pub fn replace_lookup(&self, original: &ObjectId) -> RepoResult<Option<ObjectId>> {
        let state: ReplaceState = load_state(&self.state_path(files::REPLACE))?;
        Ok(state.replacements.get(&original.to_hex()).copied())
    }

    pub fn replace_remove(&self, original: &ObjectId) -> RepoResult<()> {
        let file = self.state_path(files::REPLACE);
        let mut state: ReplaceState = load_state(&file)?;
        if state.replacements.remove(&original.to_hex()).is_none() {
            return Err(RepoError::NotFound(format!("replacement for {original}")));
        }
        Ok(store_state(&file, &state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::InitOptions;
    use tempfile::TempDir;

    fn make_repo() -> (TempDir, Repo) {
        let dir = TempDir::new().unwrap();
        let repo = Repo::init(dir.path(), InitOptions::default()).unwrap();
        (dir, repo)
    }

    #[test]
    fn stash_push_list_pop() {
        let (dir, repo) = make_repo();
        std::fs::write(dir.path().join("a.txt"), b"stash me").unwrap();
        repo.add(&["a.txt".into()]).unwrap();
        repo.stash_push("wip").unwrap();

        let entries = repo.stash_list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "wip");

        // Clobber the worktree, then pop restores it.
        std::fs::write(dir.path().join("a.txt"), b"clobbered").unwrap();
        let entry = repo.stash_pop().unwrap();
        assert_eq!(entry.message, "wip");
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"stash me");
        assert!(repo.stash_list().unwrap().is_empty());
    }

    #[test]
    fn stash_pop_empty_is_not_found() {
        let (_dir, repo) = make_repo();
        assert!(matches!(
            repo.stash_pop().unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    #[test]
    fn remotes_crud() {
        let (_dir, repo) = make_repo();
        repo.remote_add("origin", "https://example.com/a.git").unwrap();
        assert!(matches!(
            repo.remote_add("origin", "x").unwrap_err(),
            RepoError::AlreadyExists(_)
        ));
        let remotes = repo.remote_list().unwrap();
        assert_eq!(
            remotes["origin"].fetch,
            "+refs/heads/*:refs/remotes/origin/*"
        );
        repo.remote_remove("origin").unwrap();
        assert!(matches!(
            repo.remote_remove("origin").unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    #[test]
    fn submodules_crud_with_path_safety() {
        let (_dir, repo) = make_repo();
        repo.submodule_register("vendor", "vendor/lib", "../lib.git")
            .unwrap();
        assert!(repo
            .submodule_register("evil", "../outside", "x")
            .is_err());
        assert_eq!(repo.submodule_list().unwrap().len(), 1);
        repo.submodule_remove("vendor").unwrap();
        assert!(repo.submodule_list().unwrap().is_empty());
    }

    #[test]
    fn worktree_lifecycle() {
        let (_dir, repo) = make_repo();
        repo.worktree_add("wt/feature", None).unwrap();
        repo.worktree_add("wt/hotfix", None).unwrap();
        assert!(matches!(
            repo.worktree_add("wt/feature", None).unwrap_err(),
            RepoError::AlreadyExists(_)
        ));

        repo.mark_worktree_prunable("wt/hotfix", true).unwrap();
        let pruned = repo.prune_worktrees().unwrap();
        assert_eq!(pruned, vec!["wt/hotfix"]);
        assert_eq!(repo.worktree_list().unwrap().len(), 1);
    }

    #[test]
    fn notes_crud() {
        let (_dir, repo) = make_repo();
        let target = repo.write_blob(b"noted").unwrap();
        repo.note_set(&target, "reviewed").unwrap();
        assert_eq!(repo.note_get(&target).unwrap().as_deref(), Some("reviewed"));
        repo.note_remove(&target).unwrap();
        assert_eq!(repo.note_get(&target).unwrap(), None);
        assert!(matches!(
            repo.note_remove(&target).unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    #[test]
    fn replace_crud() {
        let (_dir, repo) = make_repo();
        let a = repo.write_blob(b"original").unwrap();
        let b = repo.write_blob(b"replacement").unwrap();
        repo.replace_set(&a, &b).unwrap();
        assert_eq!(repo.replace_lookup(&a).unwrap(), Some(b));
        repo.replace_remove(&a).unwrap();
        assert_eq!(repo.replace_lookup(&a).unwrap(), None);
    }
}
