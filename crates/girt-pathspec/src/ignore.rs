use crate::error::PathspecResult;
use crate::glob::compile_glob;

/// Evaluate ignore patterns against a path: patterns apply in order,
/// `#` lines and blanks are skipped, a `!` prefix un-ignores, and the
/// last matching rule wins.
pub fn evaluate_ignore(path: &str, patterns: &[String]) -> PathspecResult<bool> {
    let mut ignored = false;
    for raw in patterns {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (negated, pattern) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        if compile_glob(pattern)?.is_match(path) {
            ignored = !negated;
        }
    }
    Ok(ignored)
}
