//! Path matchers shared by ignore files, attribute files and
//! sparse-checkout rules.
//!
//! All three speak one glob grammar: `**` crosses directory
//! boundaries, `*` and `?` do not, everything else is literal.
//! Patterns are anchored to the whole path.

pub mod attributes;
pub mod error;
pub mod glob;
pub mod ignore;
pub mod sparse;

pub use attributes::{evaluate_attributes, AttrState};
pub use error::{PathspecError, PathspecResult};
pub use glob::compile_glob;
pub use ignore::evaluate_ignore;
pub use sparse::{normalize_rules, select_sparse_paths, sparse_match, SparseMode};
