//! The index ↔ worktree bridge: staging, status and checkout.

use std::fs;

use girt_index::{IndexEntry, DEFAULT_FILE_MODE};
use girt_pathspec::select_sparse_paths;
use girt_state::{files, read_state, store_state, SparseState};
use girt_types::{ensure_safe_path, ObjectKind};

use crate::error::RepoResult;
use crate::repo::Repo;

/// Staged and unstaged paths, sorted and deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
}

impl Repo {
    /// Stage paths: hash each worktree file into a blob and upsert its
    /// index entry. The index is written back once, sorted.
    pub fn add(&self, paths: &[String]) -> RepoResult<()> {
        let worktree = self.worktree()?.to_path_buf();
        let mut index = self.read_index()?;
        for path in paths {
            ensure_safe_path(path)?;
            let bytes = fs::read(worktree.join(path))?;
            let oid = self.odb().write_loose(ObjectKind::Blob, &bytes)?;
            index.upsert(IndexEntry {
                path: path.clone(),
                oid,
                mode: DEFAULT_FILE_MODE,
            });
        }
        self.write_index(&index)
    }

    /// Compare the index against the worktree.
    ///
    /// Staged: every index path. Unstaged: paths whose worktree bytes
    /// are unreadable or hash to a different blob than the index
    /// records.
    pub fn status(&self) -> RepoResult<StatusReport> {
        let worktree = self.worktree()?.to_path_buf();
        let index = self.read_index()?;

        let mut staged: Vec<String> = index.entries.iter().map(|e| e.path.clone()).collect();
        staged.sort();
        staged.dedup();

        let mut unstaged = Vec::new();
        for entry in &index.entries {
            match fs::read(worktree.join(&entry.path)) {
                Ok(bytes) => {
                    let oid = girt_hash::hash_object(ObjectKind::Blob, &bytes, self.algorithm());
                    if oid != entry.oid {
                        unstaged.push(entry.path.clone());
                    }
                }
                Err(_) => unstaged.push(entry.path.clone()),
            }
        }
        unstaged.sort();
        unstaged.dedup();

        Ok(StatusReport { staged, unstaged })
    }

    /// Write files into the worktree, sorted by relative path. Every
    /// target is safety-checked before anything is written.
    pub fn checkout(&self, files: &[(String, Vec<u8>)]) -> RepoResult<()> {
        let worktree = self.worktree()?.to_path_buf();
        let mut sorted: Vec<&(String, Vec<u8>)> = files.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (rel_path, payload) in sorted {
            ensure_safe_path(rel_path)?;
            let target = worktree.join(rel_path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, payload)?;
        }
        Ok(())
    }

    // ---- Ignore and attributes ----

    /// Is `path` ignored? Rules come from `info/exclude` then the
    /// root `.gitignore`; the last matching rule wins across both.
    pub fn is_ignored(&self, path: &str) -> RepoResult<bool> {
        let mut patterns = Vec::new();
        for file in [
            self.git_dir().join("info/exclude"),
            self.worktree()?.join(".gitignore"),
        ] {
            match fs::read_to_string(&file) {
                Ok(text) => patterns.extend(text.lines().map(str::to_string)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(girt_pathspec::evaluate_ignore(path, &patterns)?)
    }

    /// Collect the attributes for a path from the root
    /// `.gitattributes`.
    pub fn attributes_for(
        &self,
        path: &str,
    ) -> RepoResult<std::collections::BTreeMap<String, girt_pathspec::AttrState>> {
        let rules = match fs::read_to_string(self.worktree()?.join(".gitattributes")) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(girt_pathspec::evaluate_attributes(path, &rules)?)
    }

    // ---- Sparse checkout ----

    /// Persist the sparse-checkout rules, safety-checking every rule.
    pub fn set_sparse_checkout(&self, state: &SparseState) -> RepoResult<()> {
        for rule in &state.rules {
            if rule != "." {
                ensure_safe_path(rule.trim_matches('/'))?;
            }
        }
        store_state(&self.state_path(files::SPARSE), state)?;
        Ok(())
    }

    pub fn sparse_checkout(&self) -> RepoResult<Option<SparseState>> {
        let path = self.state_path(files::SPARSE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_state(&path)?))
    }

    /// Index paths selected by the current sparse rules; with no
    /// sparse state, every index path is selected.
    pub fn sparse_selected_paths(&self) -> RepoResult<Vec<String>> {
        let index = self.read_index()?;
        let paths: Vec<String> = index.entries.iter().map(|e| e.path.clone()).collect();
        match self.sparse_checkout()? {
            Some(state) => Ok(select_sparse_paths(&paths, &state.rules, state.mode)?),
            None => Ok(paths),
        }
    }
}
