use std::fs;
use std::path::{Path, PathBuf};

use girt_index::Index;
use girt_odb::ObjectDb;
use girt_refs::{Head, RefStore};
use girt_types::{HashAlgorithm, ObjectId, ObjectKind};

use crate::config;
use crate::error::{RepoError, RepoResult};
use crate::ports::{CredentialPort, HookPort, HttpPort, SignaturePort};

/// Options for `Repo::init`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InitOptions {
    pub hash_algorithm: Option<HashAlgorithm>,
}

/// One repository: a gitDir, its worktree and the composed stores.
pub struct Repo {
    git_dir: PathBuf,
    worktree: Option<PathBuf>,
    algo: HashAlgorithm,
    odb: ObjectDb,
    refs: RefStore,
    pub(crate) credentials: Option<Box<dyn CredentialPort>>,
    pub(crate) hooks: Option<Box<dyn HookPort>>,
    pub(crate) signatures: Option<Box<dyn SignaturePort>>,
    pub(crate) http: Option<Box<dyn HttpPort>>,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("git_dir", &self.git_dir)
            .field("worktree", &self.worktree)
            .field("algo", &self.algo)
            .finish_non_exhaustive()
    }
}

impl Repo {
    /// Create a fresh repository under `worktree_path/.git`.
    pub fn init(worktree_path: &Path, options: InitOptions) -> RepoResult<Self> {
        let algo = options.hash_algorithm.unwrap_or(HashAlgorithm::Sha1);
        let git_dir = worktree_path.join(".git");

        for dir in [
            "branches",
            "hooks",
            "info",
            "objects/info",
            "objects/pack",
            "refs/heads",
            "refs/tags",
            "logs/refs/heads",
            "logs/refs/tags",
        ] {
            fs::create_dir_all(git_dir.join(dir))?;
        }

        fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n")?;
        fs::write(
            git_dir.join("description"),
            "Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;
        config::write_base_config(&git_dir.join("config"), algo)?;

        Ok(Self::assemble(git_dir, Some(worktree_path.to_path_buf()), algo))
    }

    /// Open an existing repository: either a working tree containing
    /// `.git`, or a gitDir itself.
    pub fn open(path: &Path) -> RepoResult<Self> {
        let (git_dir, worktree) = if path.join(".git").is_dir() {
            (path.join(".git"), Some(path.to_path_buf()))
        } else {
            (path.to_path_buf(), None)
        };

        for required in ["objects", "refs", "config"] {
            if !git_dir.join(required).exists() {
                return Err(RepoError::NotFound(format!(
                    "{} is not a repository: missing {required}",
                    path.display()
                )));
            }
        }

        let algo = config::read_hash_algorithm(&git_dir.join("config"))?;
        Ok(Self::assemble(git_dir, worktree, algo))
    }

    fn assemble(git_dir: PathBuf, worktree: Option<PathBuf>, algo: HashAlgorithm) -> Self {
        let odb = ObjectDb::new(git_dir.join("objects"), algo);
        let refs = RefStore::new(git_dir.clone(), algo);
        Self {
            git_dir,
            worktree,
            algo,
            odb,
            refs,
            credentials: None,
            hooks: None,
            signatures: None,
            http: None,
        }
    }

    // ---- Port wiring ----

    pub fn with_credentials(mut self, port: Box<dyn CredentialPort>) -> Self {
        self.credentials = Some(port);
        self
    }

    pub fn with_hooks(mut self, port: Box<dyn HookPort>) -> Self {
        self.hooks = Some(port);
        self
    }

    pub fn with_signatures(mut self, port: Box<dyn SignaturePort>) -> Self {
        self.signatures = Some(port);
        self
    }

    pub fn with_http(mut self, port: Box<dyn HttpPort>) -> Self {
        self.http = Some(port);
        self
    }

    // ---- Accessors ----

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn worktree(&self) -> RepoResult<&Path> {
        self.worktree
            .as_deref()
            .ok_or_else(|| RepoError::InvalidArgument("repository has no worktree".into()))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }

    pub fn odb(&self) -> &ObjectDb {
        &self.odb
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub(crate) fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub(crate) fn state_path(&self, file: &str) -> PathBuf {
        self.git_dir.join(file)
    }

    // ---- Object operations ----

    pub fn write_blob(&self, data: &[u8]) -> RepoResult<ObjectId> {
        Ok(self.odb.write_loose(ObjectKind::Blob, data)?)
    }

    pub fn write_object(&self, kind: ObjectKind, payload: &[u8]) -> RepoResult<ObjectId> {
        Ok(self.odb.write_loose(kind, payload)?)
    }

    pub fn read_object(&self, oid: &ObjectId) -> RepoResult<Vec<u8>> {
        Ok(self.odb.read_object(oid)?)
    }

    // ---- Ref operations ----

    pub fn resolve_ref(&self, name: &str) -> RepoResult<Option<ObjectId>> {
        Ok(self.refs.resolve_ref(name)?)
    }

    pub fn resolve_head(&self) -> RepoResult<ObjectId> {
        Ok(self.refs.resolve_head()?)
    }

    pub fn read_head(&self) -> RepoResult<Head> {
        Ok(self.refs.read_head()?)
    }

    pub fn update_ref(&self, name: &str, oid: &ObjectId, message: &str) -> RepoResult<()> {
        Ok(self.refs.update_ref(name, oid, message)?)
    }

    pub fn create_ref(&self, name: &str, oid: &ObjectId, message: &str) -> RepoResult<()> {
        Ok(self.refs.create_ref(name, oid, message)?)
    }

    pub fn delete_ref(&self, name: &str, message: &str) -> RepoResult<()> {
        Ok(self.refs.delete_ref(name, message)?)
    }

    pub fn list_refs(&self, prefix: &str) -> RepoResult<Vec<(String, ObjectId)>> {
        Ok(self.refs.list_refs(prefix)?)
    }

    pub fn verify_ref(&self, name: &str, oid: &ObjectId) -> RepoResult<bool> {
        Ok(self.refs.verify_ref(name, oid)?)
    }

    // ---- Index ----

    pub fn read_index(&self) -> RepoResult<Index> {
        Ok(Index::load(&self.index_path())?)
    }

    pub(crate) fn write_index(&self, index: &Index) -> RepoResult<()> {
        Ok(index.store(&self.index_path())?)
    }

    // ---- Signatures ----

    /// Verify the `gpgsig` header of a commit through the signature
    /// port. An unsigned commit is a signature failure, not a format
    /// failure.
    pub fn verify_commit_signature(&self, oid: &ObjectId) -> RepoResult<bool> {
        let payload = self.odb.read_object(oid)?;
        let Some((signature, signed)) = girt_odb::split_signature(&payload) else {
            return Err(RepoError::SignatureInvalid(format!(
                "commit {oid} carries no signature"
            )));
        };
        let port = self.signatures.as_ref().ok_or_else(|| {
            RepoError::Unsupported("no signature port configured".into())
        })?;
        Ok(port.verify(&signed, &signature))
    }
}
