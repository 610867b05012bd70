//! Clone orchestration.
//!
//! Local paths and `file://` URLs clone directly; `http(s)://` and
//! `ssh://` sources go through the discovery/credential dance and
//! resolve to a local mirror path — the wire transfer of pack data is
//! outside this core.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use girt_odb::{materialize_tree, parse_commit, shallow_boundary};
use girt_protocol::discovery_service;
use girt_state::{files, store_state, PartialCloneState};
use girt_types::{ensure_safe_path, ObjectId};

use crate::config;
use crate::error::{RepoError, RepoResult};
use crate::ports::ProgressEvent;
use crate::repo::{InitOptions, Repo};
use crate::ProgressCallback;

const ORIGIN_FETCH_SPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Options for `Repo::clone_repo`.
#[derive(Clone, Debug, Default)]
pub struct CloneOptions {
    pub branch: Option<String>,
    pub depth: Option<i64>,
    pub filter: Option<String>,
    pub recurse_submodules: bool,
}

/// A parsed `.gitmodules` block.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SubmoduleSpec {
    name: String,
    path: String,
    url: String,
}

impl Repo {
    /// Clone `src` into the directory `dst`.
    pub fn clone_repo(
        &self,
        src: &str,
        dst: &Path,
        options: &CloneOptions,
        progress: Option<ProgressCallback>,
    ) -> RepoResult<Repo> {
        let depth = validate_options(options)?;

        let source_path = self.resolve_source(src, progress)?;
        emit(progress, "resolve", source_path.display().to_string());

        if dst.exists() {
            if !dst.is_dir() {
                return Err(RepoError::AlreadyExists(format!(
                    "{} exists and is not a directory",
                    dst.display()
                )));
            }
            if fs::read_dir(dst)?.next().is_some() {
                return Err(RepoError::AlreadyExists(format!(
                    "{} is not empty",
                    dst.display()
                )));
            }
        }

        let source = Repo::open(&source_path)?;
        let target = Repo::init(
            dst,
            InitOptions {
                hash_algorithm: Some(source.algorithm()),
            },
        )?;

        copy_dir(source.git_dir(), target.git_dir())?;
        config::write_base_config(&target.git_dir().join("config"), source.algorithm())?;
        emit(progress, "copy", "objects copied");
        let target = Repo::open(dst)?;

        if let Some(branch) = &options.branch {
            let branch = branch.trim();
            let refname = format!("refs/heads/{branch}");
            if target.refs().resolve_ref(&refname)?.is_none() {
                return Err(RepoError::NotFound(format!("branch {branch:?} in source")));
            }
            target.refs().set_head_symbolic(&refname)?;
        }

        self.rebind_remote_refs(&target)?;

        let head_tree = target.materialize_head(progress)?;

        if let Some(depth) = depth {
            let head = target.resolve_head()?;
            let boundary = shallow_boundary(target.odb(), &head, depth)?;
            let mut text = String::new();
            for oid in &boundary {
                text.push_str(&format!("{oid}\n"));
            }
            fs::write(target.git_dir().join("shallow"), text)?;
        }

        if let Some(filter) = &options.filter {
            let state = PartialCloneState {
                filter_spec: Some(filter.trim().to_string()),
                capabilities: vec![
                    "filter".to_string(),
                    format!("object-format={}", target.algorithm()),
                ],
                promisor_objects: BTreeMap::new(),
            };
            store_state(&target.state_path(files::PARTIAL_CLONE), &state)?;
        }

        config::set_remote_section(
            &target.git_dir().join("config"),
            "origin",
            src,
            ORIGIN_FETCH_SPEC,
            options.filter.as_deref().map(str::trim),
        )?;

        if options.recurse_submodules {
            if let Some(tree) = head_tree {
                self.clone_submodules(&target, &tree, options, progress)?;
            }
        }

        tracing::info!(src, dst = %dst.display(), "clone completed");
        Ok(target)
    }

    /// Resolve a source spec to a local repository path.
    fn resolve_source(&self, src: &str, progress: Option<ProgressCallback>) -> RepoResult<PathBuf> {
        if let Some(path) = src.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            let http = self.http.as_ref().ok_or_else(|| {
                RepoError::Unsupported("http clone requires an HTTP port".into())
            })?;
            let url = format!("{}/info/refs?service=git-upload-pack", src.trim_end_matches('/'));
            discovery_service(&url)?;
            let response = http.get(&url)?;
            if response.status != 200 {
                return Err(RepoError::Network {
                    status: response.status,
                    message: format!("discovery against {url} failed"),
                });
            }
            let mirror = response.headers.get("x-codex-repo-path").ok_or_else(|| {
                RepoError::Unsupported(
                    "server did not provide a local mirror; the upload-pack client is not part of this core"
                        .into(),
                )
            })?;
            return Ok(PathBuf::from(mirror));
        }
        if src.starts_with("ssh://") {
            let credentials = self
                .credentials
                .as_ref()
                .ok_or_else(|| RepoError::AuthRequired(src.to_string()))?;
            let credential = credentials
                .get(src)
                .ok_or_else(|| RepoError::AuthRequired(src.to_string()))?;
            emit(
                progress,
                "authenticate",
                format!("ssh as {} (secret: ***)", credential.username),
            );
            tracing::info!(url = src, user = %credential.username, "ssh credential obtained");
            let rest = &src["ssh://".len()..];
            let path_start = rest.find('/').ok_or_else(|| {
                RepoError::InvalidArgument(format!("ssh url has no path: {src}"))
            })?;
            return Ok(PathBuf::from(&rest[path_start..]));
        }
        Ok(PathBuf::from(src))
    }

    /// Create `refs/remotes/origin/*` mirrors and, when HEAD is
    /// symbolic, drop every other local head.
    fn rebind_remote_refs(&self, target: &Repo) -> RepoResult<()> {
        let heads = target.refs().branches()?;
        for (name, oid) in &heads {
            let short = name.strip_prefix("refs/heads/").unwrap_or(name);
            target
                .refs()
                .update_ref(&format!("refs/remotes/origin/{short}"), oid, "clone: remote-tracking")?;
        }

        if let Ok(girt_refs::Head::Symbolic(head_ref)) = target.refs().read_head() {
            if let Some(head_branch) = head_ref.strip_prefix("refs/heads/") {
                for (name, _) in &heads {
                    if name != &head_ref {
                        target.refs().delete_ref(name, "clone: trim non-head branch")?;
                    }
                }
                let origin_head = target.git_dir().join("refs/remotes/origin/HEAD");
                if let Some(parent) = origin_head.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(
                    origin_head,
                    format!("ref: refs/remotes/origin/{head_branch}\n"),
                )?;
            }
        }
        Ok(())
    }

    /// Check out the head commit's tree; gitlinks become empty
    /// directories. Returns the head tree OID when one exists.
    fn materialize_head(&self, progress: Option<ProgressCallback>) -> RepoResult<Option<ObjectId>> {
        let head = match self.resolve_head() {
            Ok(head) => head,
            Err(RepoError::Refs(girt_refs::RefError::NotFound(_))) => return Ok(None),
            Err(e) => return Err(e),
        };
        let info = parse_commit(&self.odb().read_object(&head)?)?;
        let tree = materialize_tree(self.odb(), &info.tree)?;

        let files: Vec<(String, Vec<u8>)> = tree.files.into_iter().collect();
        self.checkout(&files)?;
        let worktree = self.worktree()?.to_path_buf();
        for gitlink in &tree.gitlinks {
            ensure_safe_path(&gitlink.path)?;
            fs::create_dir_all(worktree.join(&gitlink.path))?;
        }
        emit(progress, "materialize", format!("{} files", files.len()));
        Ok(Some(info.tree))
    }

    fn clone_submodules(
        &self,
        target: &Repo,
        head_tree: &ObjectId,
        options: &CloneOptions,
        progress: Option<ProgressCallback>,
    ) -> RepoResult<()> {
        let tree = materialize_tree(target.odb(), head_tree)?;
        let Some(gitmodules) = tree.files.get(".gitmodules") else {
            return Ok(());
        };
        let text = std::str::from_utf8(gitmodules).map_err(|_| {
            RepoError::InvalidArgument(".gitmodules is not UTF-8".into())
        })?;

        for spec in parse_gitmodules(text) {
            ensure_safe_path(&spec.path)?;
            let sub_dst = target.worktree()?.join(&spec.path);
            let sub_options = CloneOptions {
                branch: None,
                depth: options.depth,
                filter: options.filter.clone(),
                recurse_submodules: options.recurse_submodules,
            };
            emit(progress, "submodule", spec.name.clone());
            let sub_repo = self.clone_repo(&spec.url, &sub_dst, &sub_options, progress)?;

            // Pin the submodule at the gitlink commit from the head tree.
            if let Some(gitlink) = tree.gitlinks.iter().find(|g| g.path == spec.path) {
                if sub_repo.odb().contains(&gitlink.oid) {
                    sub_repo.refs().set_head_detached(&gitlink.oid)?;
                    sub_repo.materialize_head(progress)?;
                }
            }
        }
        Ok(())
    }
}

fn validate_options(options: &CloneOptions) -> RepoResult<Option<usize>> {
    let depth = match options.depth {
        None => None,
        Some(d) if d >= 1 => Some(d as usize),
        Some(d) => {
            return Err(RepoError::InvalidArgument(format!(
                "depth must be a positive integer, got {d}"
            )))
        }
    };
    if let Some(branch) = &options.branch {
        if branch.trim().is_empty() {
            return Err(RepoError::InvalidArgument("branch must be non-empty".into()));
        }
    }
    if let Some(filter) = &options.filter {
        if filter.trim().is_empty() {
            return Err(RepoError::InvalidArgument("filter must be non-empty".into()));
        }
    }
    Ok(depth)
}

fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

fn parse_gitmodules(text: &str) -> Vec<SubmoduleSpec> {
    let mut specs = Vec::new();
    let mut name: Option<String> = None;
    let mut path: Option<String> = None;
    let mut url: Option<String> = None;

    let flush = |name: &mut Option<String>, path: &mut Option<String>, url: &mut Option<String>, specs: &mut Vec<SubmoduleSpec>| {
        if let (Some(n), Some(p), Some(u)) = (name.take(), path.take(), url.take()) {
            specs.push(SubmoduleSpec {
                name: n,
                path: p,
                url: u,
            });
        } else {
            path.take();
            url.take();
        }
    };

    for line in text.lines() {
        let line = line.trim();
        if let Some(section) = line.strip_prefix("[submodule \"") {
            flush(&mut name, &mut path, &mut url, &mut specs);
            if let Some(n) = section.strip_suffix("\"]") {
                name = Some(n.to_string());
            }
        } else if let Some(value) = line.strip_prefix("path") {
            path = Some(value.trim_start_matches([' ', '=']).trim().to_string());
        } else if let Some(value) = line.strip_prefix("url") {
            url = Some(value.trim_start_matches([' ', '=']).trim().to_string());
        }
    }
    flush(&mut name, &mut path, &mut url, &mut specs);
    specs
}

fn emit(progress: Option<ProgressCallback>, phase: &str, message: impl Into<String>) {
    if let Some(cb) = progress {
        cb(&ProgressEvent::phase(phase, message));
    }
}
