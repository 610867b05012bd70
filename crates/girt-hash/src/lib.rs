//! Content hashing for the object database.
//!
//! Git addresses an object by digesting the ASCII envelope
//! `<type> SP <decimal-size> NUL` followed by the raw payload. This
//! crate computes that digest for both supported algorithms, and
//! exposes the CRC32 used by pack index consumers.

pub mod crc;
pub mod object;

pub use crc::{crc32, crc32_hex};
pub use object::{envelope, hash_object};
