//! The minimal unified patch.
//!
//! Generation emits a single hunk that lists every before-line as `-`
//! and every after-line as `+`; parsing treats the patch as a
//! full-file replacement. This is deliberately not a hunk-merging
//! patch engine — replay drives whole files forward or backward.

use std::fs;
use std::path::Path;

use girt_types::ensure_safe_path;

use crate::error::{DiffError, DiffResult};

/// A parsed patch: the safe target path plus the replacement line sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPatch {
    pub path: String,
    /// Lines introduced by the patch (`+`).
    pub added: Vec<String>,
    /// Lines removed by the patch (`-`).
    pub removed: Vec<String>,
}

/// Split content into lines: `\r\n` collapses to `\n` first, then
/// split on LF. Empty input is the empty list.
pub fn split_lines(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Emit the unified patch turning `before` into `after` at `path`.
pub fn generate_patch(path: &str, before: &str, after: &str) -> String {
    let before_lines = split_lines(before);
    let after_lines = split_lines(after);

    let mut out = String::new();
    out.push_str(&format!("--- a/{path}\n"));
    out.push_str(&format!("+++ b/{path}\n"));
    out.push_str(&format!(
        "@@ -1,{} +1,{} @@\n",
        before_lines.len(),
        after_lines.len()
    ));
    for line in &before_lines {
        out.push_str(&format!("-{line}\n"));
    }
    for line in &after_lines {
        out.push_str(&format!("+{line}\n"));
    }
    out
}

/// Parse a unified patch: locate `+++ b/<path>`, check path safety,
/// and collect the `+`/`-` bodies (header lines excluded).
pub fn parse_patch(text: &str) -> DiffResult<ParsedPatch> {
    let mut path = None;
    for line in text.lines() {
        if let Some(target) = line.strip_prefix("+++ b/") {
            path = Some(target.trim().to_string());
            break;
        }
    }
    let path = path.ok_or_else(|| DiffError::Format("patch has no '+++ b/' target".into()))?;
    ensure_safe_path(&path)?;

    let mut added = Vec::new();
    let mut removed = Vec::new();
    for line in text.lines() {
        if line.starts_with("---") || line.starts_with("+++") || line.starts_with("@@") {
            continue;
        }
        if let Some(body) = line.strip_prefix('+') {
            added.push(body.to_string());
        } else if let Some(body) = line.strip_prefix('-') {
            removed.push(body.to_string());
        }
    }

    Ok(ParsedPatch {
        path,
        added,
        removed,
    })
}

/// Apply a patch under `root`: forward writes the `+` lines, reverse
/// writes the `-` lines, joined by LF. Returns the target path.
pub fn apply_unified_patch(root: &Path, text: &str, reverse: bool) -> DiffResult<String> {
    let patch = parse_patch(text)?;
    let lines = if reverse { &patch.removed } else { &patch.added };
    let target = root.join(&patch.path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, lines.join("\n"))?;
    Ok(patch.path)
}
