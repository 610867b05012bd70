//! The staging index (DIRC version 2).
//!
//! Two physical payloads share the 8-byte magic `DIRC\0\0\0\2`: the
//! canonical Git binary layout (entries with a fixed stat prefix, a
//! NUL-terminated path and 8-byte alignment) and a JSON object used by
//! sibling implementations, recognised by the `{` byte right after the
//! magic. Decoding accepts both; encoding emits magic + JSON.

pub mod error;
pub mod format;

pub use error::{IndexError, IndexResult};
pub use format::{Index, IndexEntry, DEFAULT_FILE_MODE, INDEX_MAGIC};
