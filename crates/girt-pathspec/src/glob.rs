use regex::Regex;

use crate::error::{PathspecError, PathspecResult};

/// Compile a glob into an anchored regex.
///
/// `**` matches any characters including `/`; `*` any run of
/// non-`/` characters; `?` a single non-`/` character; everything
/// else is matched literally.
pub fn compile_glob(pattern: &str) -> PathspecResult<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');

    let bytes = pattern.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    regex.push_str(".*");
                    i += 2;
                } else {
                    regex.push_str("[^/]*");
                    i += 1;
                }
            }
            b'?' => {
                regex.push_str("[^/]");
                i += 1;
            }
            _ => {
                let ch = pattern[i..].chars().next().expect("in-bounds char");
                regex.push_str(&regex::escape(&ch.to_string()));
                i += ch.len_utf8();
            }
        }
    }

    regex.push('$');
    Regex::new(&regex).map_err(|e| PathspecError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
