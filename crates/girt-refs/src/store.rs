use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use girt_types::{HashAlgorithm, ObjectId};

use crate::error::{RefError, RefResult};

/// The committer identity stamped on every reflog line.
const REFLOG_IDENT: &str = "repo <repo@example.local>";

/// The current HEAD state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// `ref: <refname>` — HEAD follows a branch.
    Symbolic(String),
    /// A detached OID.
    Detached(ObjectId),
}

/// Normalize a ref name: a bare name `X` becomes `refs/X`; names
/// already under `refs/` (and HEAD) pass through.
pub fn normalize_ref_name(name: &str) -> String {
    if name == "HEAD" || name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/{name}")
    }
}

/// Filesystem reference store rooted at a gitDir.
///
/// There is no internal locking; concurrent writers are expected to be
/// serialized by the caller or rejected by the receive-pack CAS layer.
pub struct RefStore {
    git_dir: PathBuf,
    algo: HashAlgorithm,
}

impl RefStore {
    pub fn new(git_dir: impl Into<PathBuf>, algo: HashAlgorithm) -> Self {
        Self {
            git_dir: git_dir.into(),
            algo,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    fn packed_refs_path(&self) -> PathBuf {
        self.git_dir.join("packed-refs")
    }

    fn reflog_path(&self, name: &str) -> PathBuf {
        self.git_dir.join("logs").join(name)
    }

    // ---- Resolution ----

    /// Resolve a ref to an OID: loose file first, then `packed-refs`.
    pub fn resolve_ref(&self, name: &str) -> RefResult<Option<ObjectId>> {
        let name = normalize_ref_name(name);
        match fs::read_to_string(self.ref_path(&name)) {
            Ok(text) => {
                let oid = ObjectId::from_hex(text.trim()).map_err(|e| {
                    RefError::Format(format!("loose ref {name} is not an OID: {e}"))
                })?;
                return Ok(Some(oid));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self.packed_refs()?.into_iter().find_map(|(packed_name, oid)| {
            (packed_name == name).then_some(oid)
        }))
    }

    /// Resolve HEAD to an OID, following a symbolic target.
    pub fn resolve_head(&self) -> RefResult<ObjectId> {
        match self.read_head()? {
            Head::Symbolic(target) => self
                .resolve_ref(&target)?
                .ok_or(RefError::NotFound(target)),
            Head::Detached(oid) => Ok(oid),
        }
    }

    /// Read HEAD without resolving a symbolic target.
    pub fn read_head(&self) -> RefResult<Head> {
        let text = match fs::read_to_string(self.ref_path("HEAD")) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RefError::NotFound("HEAD".into()))
            }
            Err(e) => return Err(e.into()),
        };
        let text = text.trim();
        if let Some(target) = text.strip_prefix("ref: ") {
            return Ok(Head::Symbolic(target.trim().to_string()));
        }
        let oid = ObjectId::from_hex(text)
            .map_err(|_| RefError::Format(format!("HEAD holds neither a ref nor an OID: {text:?}")))?;
        Ok(Head::Detached(oid))
    }

    /// Point HEAD at a branch (symbolic).
    pub fn set_head_symbolic(&self, refname: &str) -> RefResult<()> {
        let refname = normalize_ref_name(refname);
        fs::write(self.ref_path("HEAD"), format!("ref: {refname}\n"))?;
        Ok(())
    }

    /// Detach HEAD at an OID.
    pub fn set_head_detached(&self, oid: &ObjectId) -> RefResult<()> {
        fs::write(self.ref_path("HEAD"), format!("{oid}\n"))?;
        Ok(())
    }

    // ---- Listing ----

    /// List refs under a prefix, lexicographically sorted by name.
    ///
    /// `"refs"` matches everything; `"refs/heads"` matches
    /// `refs/heads/*` and the exact name `refs/heads`. Loose entries
    /// shadow packed ones.
    pub fn list_refs(&self, prefix: &str) -> RefResult<Vec<(String, ObjectId)>> {
        let mut merged: std::collections::BTreeMap<String, ObjectId> =
            self.packed_refs()?.into_iter().collect();
        for (name, oid) in self.loose_refs()? {
            merged.insert(name, oid);
        }
        Ok(merged
            .into_iter()
            .filter(|(name, _)| prefix_matches(prefix, name))
            .collect())
    }

    /// All branch refs (`refs/heads/*`).
    pub fn branches(&self) -> RefResult<Vec<(String, ObjectId)>> {
        self.list_refs("refs/heads")
    }

    /// All tag refs (`refs/tags/*`).
    pub fn tags(&self) -> RefResult<Vec<(String, ObjectId)>> {
        self.list_refs("refs/tags")
    }

    // ---- Mutation ----

    /// Create or update a loose ref and append a reflog line.
    pub fn update_ref(&self, name: &str, new_oid: &ObjectId, message: &str) -> RefResult<()> {
        let name = normalize_ref_name(name);
        let old = self
            .resolve_ref(&name)?
            .unwrap_or_else(|| ObjectId::zero(self.algo));
        let path = self.ref_path(&name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{new_oid}\n"))?;
        self.append_reflog(&name, &old, new_oid, message)?;
        Ok(())
    }

    /// Create a ref; fails if the name already resolves.
    pub fn create_ref(&self, name: &str, oid: &ObjectId, message: &str) -> RefResult<()> {
        let name = normalize_ref_name(name);
        if self.resolve_ref(&name)?.is_some() {
            return Err(RefError::AlreadyExists(name));
        }
        self.update_ref(&name, oid, message)
    }

    /// Delete a ref from both loose and packed form.
    pub fn delete_ref(&self, name: &str, message: &str) -> RefResult<()> {
        let name = normalize_ref_name(name);
        let old = self
            .resolve_ref(&name)?
            .ok_or_else(|| RefError::NotFound(name.clone()))?;

        let loose = self.ref_path(&name);
        if loose.exists() {
            fs::remove_file(&loose)?;
        }
        self.remove_packed_entry(&name)?;

        let zero = ObjectId::zero(self.algo);
        self.append_reflog(&name, &old, &zero, message)?;
        Ok(())
    }

    /// Returns `true` iff the ref resolves to exactly `oid`.
    pub fn verify_ref(&self, name: &str, oid: &ObjectId) -> RefResult<bool> {
        Ok(self.resolve_ref(name)? == Some(*oid))
    }

    /// Read the reflog lines for a ref (empty when none exist).
    pub fn read_reflog(&self, name: &str) -> RefResult<Vec<String>> {
        let name = normalize_ref_name(name);
        match fs::read_to_string(self.reflog_path(&name)) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    // ---- Internals ----

    fn append_reflog(
        &self,
        name: &str,
        old: &ObjectId,
        new: &ObjectId,
        message: &str,
    ) -> RefResult<()> {
        let path = self.reflog_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let line = format!("{old} {new} {REFLOG_IDENT} {seconds} +0000\t{message}\n");
        let mut existing = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        existing.push_str(&line);
        fs::write(&path, existing)?;
        Ok(())
    }

    fn loose_refs(&self) -> RefResult<Vec<(String, ObjectId)>> {
        let refs_root = self.git_dir.join("refs");
        let mut out = Vec::new();
        if !refs_root.exists() {
            return Ok(out);
        }
        let mut stack = vec![refs_root];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    stack.push(entry.path());
                    continue;
                }
                let rel = entry
                    .path()
                    .strip_prefix(&self.git_dir)
                    .expect("entry lives under git_dir")
                    .to_string_lossy()
                    .replace('\\', "/");
                let text = fs::read_to_string(entry.path())?;
                let oid = ObjectId::from_hex(text.trim()).map_err(|e| {
                    RefError::Format(format!("loose ref {rel} is not an OID: {e}"))
                })?;
                out.push((rel, oid));
            }
        }
        Ok(out)
    }

    fn packed_refs(&self) -> RefResult<Vec<(String, ObjectId)>> {
        let text = match fs::read_to_string(self.packed_refs_path()) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for line in text.lines() {
            let line = line.trim_end();
            // Comments and peeled tag targets are skipped.
            if line.is_empty() || line.starts_with('#') || line.starts_with('^') {
                continue;
            }
            let (oid_str, name) = line.split_once(' ').ok_or_else(|| {
                RefError::Format(format!("malformed packed-refs line: {line:?}"))
            })?;
            let oid = ObjectId::from_hex(oid_str).map_err(|e| {
                RefError::Format(format!("packed-refs OID for {name}: {e}"))
            })?;
            out.push((name.to_string(), oid));
        }
        Ok(out)
    }

    /// Rewrite packed-refs without `name` and any `^` peel line that
    /// follows it. Canonical form: trailing newline only when the file
    /// is non-empty.
    fn remove_packed_entry(&self, name: &str) -> RefResult<()> {
        let path = self.packed_refs_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut kept: Vec<&str> = Vec::new();
        let mut skipping_peel = false;
        for line in text.lines() {
            if skipping_peel && line.starts_with('^') {
                skipping_peel = false;
                continue;
            }
            skipping_peel = false;
            let is_target = line
                .split_once(' ')
                .map(|(_, n)| n.trim_end() == name)
                .unwrap_or(false);
            if is_target {
                skipping_peel = true;
                continue;
            }
            kept.push(line);
        }

        let rewritten = if kept.is_empty() {
            String::new()
        } else {
            format!("{}\n", kept.join("\n"))
        };
        fs::write(&path, rewritten)?;
        Ok(())
    }
}

fn prefix_matches(prefix: &str, name: &str) -> bool {
    if prefix == "refs" || prefix.is_empty() {
        return name.starts_with("refs/") || name == "refs";
    }
    name == prefix || name.starts_with(&format!("{prefix}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn oid(fill: &str) -> ObjectId {
        ObjectId::from_hex(&fill.repeat(40)).unwrap()
    }

    fn make_store() -> (TempDir, RefStore) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        let store = RefStore::new(dir.path(), HashAlgorithm::Sha1);
        (dir, store)
    }

    #[test]
    fn normalize_bare_names() {
        assert_eq!(normalize_ref_name("feature"), "refs/feature");
        assert_eq!(normalize_ref_name("refs/heads/main"), "refs/heads/main");
        assert_eq!(normalize_ref_name("HEAD"), "HEAD");
    }

    #[test]
    fn update_and_resolve() {
        let (_dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "created").unwrap();
        assert_eq!(store.resolve_ref("refs/heads/main").unwrap(), Some(oid("a")));
        assert_eq!(store.resolve_ref("heads/main").unwrap(), Some(oid("a")));
    }

    #[test]
    fn resolve_missing_is_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.resolve_ref("refs/heads/nope").unwrap(), None);
    }

    #[test]
    fn loose_shadows_packed() {
        let (dir, store) = make_store();
        fs::write(
            dir.path().join("packed-refs"),
            format!("# pack-refs with: peeled\n{} refs/heads/main\n", oid("b")),
        )
        .unwrap();
        assert_eq!(store.resolve_ref("refs/heads/main").unwrap(), Some(oid("b")));
        store.update_ref("refs/heads/main", &oid("a"), "loose wins").unwrap();
        assert_eq!(store.resolve_ref("refs/heads/main").unwrap(), Some(oid("a")));
    }

    #[test]
    fn packed_peel_lines_ignored() {
        let (dir, store) = make_store();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/tags/v1\n^{}\n", oid("c"), oid("d")),
        )
        .unwrap();
        assert_eq!(store.resolve_ref("refs/tags/v1").unwrap(), Some(oid("c")));
        assert_eq!(store.list_refs("refs/tags").unwrap().len(), 1);
    }

    #[test]
    fn head_symbolic_resolution() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();
        store.update_ref("refs/heads/main", &oid("a"), "init").unwrap();
        assert_eq!(store.resolve_head().unwrap(), oid("a"));
        assert_eq!(
            store.read_head().unwrap(),
            Head::Symbolic("refs/heads/main".into())
        );
    }

    #[test]
    fn head_detached_resolution() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("HEAD"), format!("{}\n", oid("e"))).unwrap();
        assert_eq!(store.resolve_head().unwrap(), oid("e"));
    }

    #[test]
    fn head_garbage_is_a_format_error() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("HEAD"), "what is this\n").unwrap();
        let err = store.resolve_head().unwrap_err();
        assert!(matches!(err, RefError::Format(_)));
    }

    #[test]
    fn head_on_unborn_branch_is_not_found() {
        let (dir, store) = make_store();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let err = store.resolve_head().unwrap_err();
        assert!(matches!(err, RefError::NotFound(_)));
    }

    #[test]
    fn list_refs_prefix_semantics() {
        let (dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "m").unwrap();
        store.update_ref("refs/heads/dev", &oid("b"), "m").unwrap();
        store.update_ref("refs/tags/v1", &oid("c"), "m").unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/packed-only\n", oid("d")),
        )
        .unwrap();

        let all = store.list_refs("refs").unwrap();
        assert_eq!(all.len(), 4);
        // Sorted by name.
        let names: Vec<&str> = all.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "refs/heads/dev",
                "refs/heads/main",
                "refs/heads/packed-only",
                "refs/tags/v1"
            ]
        );

        let heads = store.list_refs("refs/heads").unwrap();
        assert_eq!(heads.len(), 3);
        assert!(store.list_refs("refs/heads/ma").unwrap().is_empty());
    }

    #[test]
    fn create_rejects_existing() {
        let (_dir, store) = make_store();
        store.create_ref("refs/heads/main", &oid("a"), "init").unwrap();
        let err = store.create_ref("refs/heads/main", &oid("b"), "again").unwrap_err();
        assert!(matches!(err, RefError::AlreadyExists(_)));
    }

    #[test]
    fn delete_loose_and_packed() {
        let (dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "init").unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!(
                "{} refs/heads/main\n{} refs/tags/v1\n^{}\n",
                oid("b"),
                oid("c"),
                oid("d")
            ),
        )
        .unwrap();

        store.delete_ref("refs/heads/main", "bye").unwrap();
        assert_eq!(store.resolve_ref("refs/heads/main").unwrap(), None);
        let packed = fs::read_to_string(dir.path().join("packed-refs")).unwrap();
        assert!(!packed.contains("refs/heads/main"));
        assert!(packed.contains("refs/tags/v1"));
        assert!(packed.ends_with('\n'));

        store.delete_ref("refs/tags/v1", "bye").unwrap();
        let packed = fs::read_to_string(dir.path().join("packed-refs")).unwrap();
        assert!(packed.is_empty(), "empty packed-refs has no trailing newline");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (_dir, store) = make_store();
        let err = store.delete_ref("refs/heads/ghost", "bye").unwrap_err();
        assert!(matches!(err, RefError::NotFound(_)));
    }

    #[test]
    fn delete_drops_peel_line_of_target_only() {
        let (dir, store) = make_store();
        fs::write(
            dir.path().join("packed-refs"),
            format!(
                "{} refs/tags/v1\n^{}\n{} refs/tags/v2\n^{}\n",
                oid("a"),
                oid("b"),
                oid("c"),
                oid("d")
            ),
        )
        .unwrap();
        store.delete_ref("refs/tags/v1", "bye").unwrap();
        let packed = fs::read_to_string(dir.path().join("packed-refs")).unwrap();
        assert_eq!(packed, format!("{} refs/tags/v2\n^{}\n", oid("c"), oid("d")));
    }

    #[test]
    fn reflog_appends_in_call_order() {
        let (_dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "first").unwrap();
        store.update_ref("refs/heads/main", &oid("b"), "second").unwrap();
        store.delete_ref("refs/heads/main", "gone").unwrap();

        let log = store.read_reflog("refs/heads/main").unwrap();
        assert_eq!(log.len(), 3);
        assert!(log[0].starts_with(&format!("{} {}", "0".repeat(40), oid("a"))));
        assert!(log[0].ends_with("\tfirst"));
        assert!(log[1].starts_with(&format!("{} {}", oid("a"), oid("b"))));
        assert!(log[2].starts_with(&format!("{} {}", oid("b"), "0".repeat(40))));
        assert!(log[0].contains("repo <repo@example.local>"));
        assert!(log[0].contains(" +0000\t"));
    }

    #[test]
    fn verify_ref_matches_resolution() {
        let (_dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "init").unwrap();
        assert!(store.verify_ref("refs/heads/main", &oid("a")).unwrap());
        assert!(!store.verify_ref("refs/heads/main", &oid("b")).unwrap());
        assert!(!store.verify_ref("refs/heads/ghost", &oid("a")).unwrap());
    }

    #[test]
    fn branches_and_tags_helpers() {
        let (_dir, store) = make_store();
        store.update_ref("refs/heads/main", &oid("a"), "m").unwrap();
        store.update_ref("refs/tags/v1", &oid("b"), "t").unwrap();
        assert_eq!(store.branches().unwrap().len(), 1);
        assert_eq!(store.tags().unwrap().len(), 1);
    }
}
