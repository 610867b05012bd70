//! The reference store.
//!
//! References live in two places that the store reconciles: one file
//! per ref under `refs/`, and the consolidated `packed-refs` text
//! file. A name present in both resolves to the loose value. Every
//! mutation appends a reflog line under `logs/<refname>`.

pub mod error;
pub mod store;

pub use error::{RefError, RefResult};
pub use store::{normalize_ref_name, Head, RefStore};
