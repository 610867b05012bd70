//! Core types shared by every girt crate.
//!
//! This crate defines the object identifier ([`ObjectId`]) and its hash
//! algorithm ([`HashAlgorithm`]), the four Git object kinds
//! ([`ObjectKind`]), worktree path safety checks, and the error-kind
//! taxonomy ([`ErrorKind`]) that every crate-level error maps into.

pub mod error;
pub mod kind;
pub mod oid;
pub mod path;

pub use error::{ErrorKind, TypeError};
pub use kind::ObjectKind;
pub use oid::{HashAlgorithm, ObjectId};
pub use path::{ensure_safe_path, is_safe_path};
