//! The object database: content-addressed loose storage plus the
//! parsing helpers built on top of it.
//!
//! Loose objects live at `objects/<oid[0:2]>/<oid[2:]>` as the
//! raw-DEFLATE compression of `<type> SP <size> NUL <payload>`.
//! Pack files, bitmaps, multi-pack-index and commit-graph files are
//! carried as opaque containers: magic bytes and names are validated,
//! contents are not interpreted, and object lookup falls through to
//! the loose store.

pub mod commit;
pub mod compress;
pub mod error;
pub mod loose;
pub mod pack;
pub mod store;
pub mod tree;
pub mod walk;

pub use commit::{parse_commit, split_signature, CommitInfo};
pub use compress::{deflate_raw, inflate_raw, InflateLimits, MAX_DELTA_CHAIN_DEPTH};
pub use error::{OdbError, OdbResult};
pub use loose::{decode_loose, encode_loose, LooseObject};
pub use store::{Envelope, ObjectDb};
pub use tree::{build_tree, parse_tree, TreeEntry, TreeEntryKind};
pub use walk::{materialize_tree, shallow_boundary, Gitlink, MaterializedTree};
