use std::collections::BTreeMap;

use crate::error::PathspecResult;
use crate::glob::compile_glob;

/// The state an attribute rule assigns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrState {
    Set,
    Unset,
    Value(String),
}

/// Collect the attributes for a path from every matching rule.
///
/// Each rule line is `<pattern> <assignment>...` where an assignment
/// is `key` (set), `-key` (unset) or `key=value`. Later rules override
/// earlier ones per key.
pub fn evaluate_attributes(
    path: &str,
    rules: &[String],
) -> PathspecResult<BTreeMap<String, AttrState>> {
    let mut collected = BTreeMap::new();
    for raw in rules {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(pattern) = parts.next() else { continue };
        if !compile_glob(pattern)?.is_match(path) {
            continue;
        }
        for assignment in parts {
            if let Some(key) = assignment.strip_prefix('-') {
                collected.insert(key.to_string(), AttrState::Unset);
            } else if let Some((key, value)) = assignment.split_once('=') {
                collected.insert(key.to_string(), AttrState::Value(value.to_string()));
            } else {
                collected.insert(assignment.to_string(), AttrState::Set);
            }
        }
    }
    Ok(collected)
}
