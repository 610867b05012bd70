//! Minimal `config` file handling: just enough of the INI dialect to
//! carry the hash algorithm and the origin remote.

use std::fs;
use std::path::Path;

use girt_types::HashAlgorithm;

use crate::error::{RepoError, RepoResult};

/// Write the base config for a fresh repository.
///
/// SHA-256 repositories use format version 1 plus the objectformat
/// extension; SHA-1 repositories stay at version 0.
pub fn write_base_config(path: &Path, algo: HashAlgorithm) -> RepoResult<()> {
    let mut text = String::from("[core]\n");
    let version = match algo {
        HashAlgorithm::Sha1 => 0,
        HashAlgorithm::Sha256 => 1,
    };
    text.push_str(&format!("\trepositoryformatversion = {version}\n"));
    text.push_str("\tfilemode = true\n");
    text.push_str("\tbare = false\n");
    if algo == HashAlgorithm::Sha256 {
        text.push_str("[extensions]\n\tobjectformat = sha256\n");
    }
    fs::write(path, text)?;
    Ok(())
}

/// Recover the hash algorithm from a config file.
pub fn read_hash_algorithm(path: &Path) -> RepoResult<HashAlgorithm> {
    let text = fs::read_to_string(path)?;
    for line in text.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("objectformat") {
            let value = value.trim_start_matches([' ', '=']).trim();
            return HashAlgorithm::from_name(value).ok_or_else(|| {
                RepoError::InvalidArgument(format!("unknown objectformat {value:?}"))
            });
        }
    }
    Ok(HashAlgorithm::Sha1)
}

/// Add or refresh a `[remote "<name>"]` section.
pub fn set_remote_section(
    path: &Path,
    name: &str,
    url: &str,
    fetch: &str,
    partial_clone_filter: Option<&str>,
) -> RepoResult<()> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let header = format!("[remote \"{name}\"]");
    let mut kept: Vec<&str> = Vec::new();
    let mut in_target = false;
    for line in existing.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_target = trimmed == header;
        }
        if !in_target {
            kept.push(line);
        }
    }

    let mut text = kept.join("\n");
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&format!("{header}\n\turl = {url}\n\tfetch = {fetch}\n"));
    if let Some(filter) = partial_clone_filter {
        text.push_str(&format!("\tpromisor = true\n\tpartialclonefilter = {filter}\n"));
    }
    fs::write(path, text)?;
    Ok(())
}
