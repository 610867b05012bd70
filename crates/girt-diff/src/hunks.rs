//! Hunked line diff for display.
//!
//! Unlike the patch module, which replaces whole files, this produces
//! grouped hunks with context via Myers diff. Porcelain layers use it
//! for `diff`-style output; nothing in apply/replay depends on it.

use similar::{ChangeTag, TextDiff};

/// A single line in a display hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// A contiguous group of changes with surrounding context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// 1-based start line in the old content.
    pub old_start: usize,
    pub old_count: usize,
    /// 1-based start line in the new content.
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// The display diff between two blobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobDiff {
    pub hunks: Vec<DiffHunk>,
    /// `true` when either side is not valid UTF-8.
    pub binary: bool,
}

impl BlobDiff {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// (lines added, lines removed) across all hunks.
    pub fn stats(&self) -> (usize, usize) {
        let mut added = 0;
        let mut removed = 0;
        for line in self.hunks.iter().flat_map(|h| &h.lines) {
            match line {
                DiffLine::Added(_) => added += 1,
                DiffLine::Removed(_) => removed += 1,
                DiffLine::Context(_) => {}
            }
        }
        (added, removed)
    }
}

/// Diff two blobs line-by-line with three lines of context.
///
/// Binary content (invalid UTF-8 on either side) collapses to a single
/// synthetic hunk that only reports the byte counts.
pub fn diff_blobs(old: &[u8], new: &[u8]) -> BlobDiff {
    let (Ok(old_str), Ok(new_str)) = (std::str::from_utf8(old), std::str::from_utf8(new)) else {
        return binary_diff(old, new);
    };
    if old_str == new_str {
        return BlobDiff {
            hunks: Vec::new(),
            binary: false,
        };
    }

    let text_diff = TextDiff::from_lines(old_str, new_str);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(3) {
        let mut lines = Vec::new();
        let (mut old_count, mut new_count) = (0usize, 0usize);
        let old_start = group.first().map(|op| op.old_range().start + 1).unwrap_or(1);
        let new_start = group.first().map(|op| op.new_range().start + 1).unwrap_or(1);

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        old_count += 1;
                        new_count += 1;
                        lines.push(DiffLine::Context(text));
                    }
                    ChangeTag::Delete => {
                        old_count += 1;
                        lines.push(DiffLine::Removed(text));
                    }
                    ChangeTag::Insert => {
                        new_count += 1;
                        lines.push(DiffLine::Added(text));
                    }
                }
            }
        }

        hunks.push(DiffHunk {
            old_start,
            old_count,
            new_start,
            new_count,
            lines,
        });
    }

    BlobDiff {
        hunks,
        binary: false,
    }
}

fn binary_diff(old: &[u8], new: &[u8]) -> BlobDiff {
    let mut lines = Vec::new();
    if !old.is_empty() {
        lines.push(DiffLine::Removed(format!("(binary, {} bytes)", old.len())));
    }
    if !new.is_empty() {
        lines.push(DiffLine::Added(format!("(binary, {} bytes)", new.len())));
    }
    BlobDiff {
        hunks: vec![DiffHunk {
            old_start: 1,
            old_count: usize::from(!old.is_empty()),
            new_start: 1,
            new_count: usize::from(!new.is_empty()),
            lines,
        }],
        binary: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_blobs() {
        let diff = diff_blobs(b"same\n", b"same\n");
        assert!(diff.is_empty());
        assert_eq!(diff.stats(), (0, 0));
    }

    #[test]
    fn single_line_change() {
        let diff = diff_blobs(b"hello world\n", b"hello girt\n");
        let (added, removed) = diff.stats();
        assert!(added >= 1 && removed >= 1);
        assert!(!diff.binary);
    }

    #[test]
    fn addition_only() {
        let diff = diff_blobs(b"a\nb\n", b"a\nb\nc\n");
        assert_eq!(diff.stats(), (1, 0));
    }

    #[test]
    fn context_surrounds_the_change() {
        let diff = diff_blobs(b"a\nb\nc\nd\ne\nf\ng\n", b"a\nb\nc\nX\ne\nf\ng\n");
        let hunk = &diff.hunks[0];
        assert!(hunk.lines.iter().any(|l| matches!(l, DiffLine::Context(_))));
        assert!(hunk.old_start >= 1 && hunk.new_start >= 1);
    }

    #[test]
    fn binary_content_detected() {
        let diff = diff_blobs(&[0xff, 0xfe, 0x00], b"text");
        assert!(diff.binary);
        assert_eq!(diff.hunks.len(), 1);
    }
}
