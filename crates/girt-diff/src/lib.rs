//! Patch plumbing: minimal unified patches treated as full-file
//! replacements, sequential replay with conflict stop, and a hunked
//! line diff for display.

pub mod error;
pub mod hunks;
pub mod patch;
pub mod replay;

pub use error::{DiffError, DiffResult};
pub use hunks::{diff_blobs, BlobDiff, DiffHunk, DiffLine};
pub use patch::{apply_unified_patch, generate_patch, parse_patch, split_lines, ParsedPatch};
pub use replay::{replay, ReplayOutcome, ReplayStatus, ReplayStep};
