use serde::{Deserialize, Serialize};

use crate::error::PathspecResult;
use crate::glob::compile_glob;

/// How sparse-checkout rules are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparseMode {
    /// Rules are directory prefixes (or `.` for the root).
    Cone,
    /// Rules are globs.
    Pattern,
}

/// Normalize a sparse rule set: trim, forward slashes, strip leading
/// and trailing slashes (`.` stays as-is), deduplicate, sort.
pub fn normalize_rules(rules: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = rules
        .iter()
        .filter_map(|raw| {
            let rule = raw.trim().replace('\\', "/");
            if rule.is_empty() {
                return None;
            }
            if rule == "." {
                return Some(rule);
            }
            let rule = rule.trim_matches('/').to_string();
            (!rule.is_empty()).then_some(rule)
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Does one rule select `path` under the given mode?
pub fn sparse_match(rule: &str, path: &str, mode: SparseMode) -> PathspecResult<bool> {
    match mode {
        SparseMode::Cone => {
            if rule == "." {
                return Ok(true);
            }
            let rule_segments: Vec<&str> = rule.split('/').collect();
            let path_segments: Vec<&str> = path.split('/').collect();
            Ok(path_segments.len() >= rule_segments.len()
                && rule_segments
                    .iter()
                    .zip(&path_segments)
                    .all(|(r, p)| r == p))
        }
        SparseMode::Pattern => Ok(compile_glob(rule)?.is_match(path)),
    }
}

/// Filter `paths` to those any rule selects; output is sorted and
/// deduplicated.
pub fn select_sparse_paths(
    paths: &[String],
    rules: &[String],
    mode: SparseMode,
) -> PathspecResult<Vec<String>> {
    let rules = normalize_rules(rules);
    let mut selected = Vec::new();
    for path in paths {
        for rule in &rules {
            if sparse_match(rule, path, mode)? {
                selected.push(path.clone());
                break;
            }
        }
    }
    selected.sort();
    selected.dedup();
    Ok(selected)
}
