use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// The hash algorithm a repository is built on.
///
/// Chosen once at `init` time and carried implicitly by every OID the
/// repository produces; the two algorithms never mix inside one repo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Raw digest width in bytes (20 or 32).
    pub fn raw_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Hex digest width in characters (40 or 64).
    pub fn hex_len(self) -> usize {
        self.raw_len() * 2
    }

    /// Recover the algorithm from a hex OID length.
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }

    /// The `object-format` capability / config name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content-addressed identifier for a stored object.
///
/// Holds the raw digest of either algorithm; the unused tail of the
/// fixed buffer is kept zeroed so equality and ordering stay derivable.
/// The canonical text form is lowercase hex of 40 or 64 characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    len: u8,
    bytes: [u8; 32],
}

impl ObjectId {
    /// Build from raw digest bytes (20 or 32 of them).
    pub fn from_raw(raw: &[u8]) -> Result<Self, TypeError> {
        if raw.len() != 20 && raw.len() != 32 {
            return Err(TypeError::InvalidOidLength { actual: raw.len() });
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self {
            len: raw.len() as u8,
            bytes,
        })
    }

    /// Parse from the canonical lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != 40 && s.len() != 64 {
            return Err(TypeError::InvalidOid {
                text: s.to_string(),
                reason: format!("length {} is neither 40 nor 64", s.len()),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(TypeError::InvalidOid {
                text: s.to_string(),
                reason: "contains non-lowercase-hex characters".into(),
            });
        }
        let raw = hex::decode(s).map_err(|e| TypeError::InvalidOid {
            text: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_raw(&raw)
    }

    /// The all-zero OID of the given width. Represents "no object" in
    /// ref updates and reflog lines.
    pub fn zero(algo: HashAlgorithm) -> Self {
        Self {
            len: algo.raw_len() as u8,
            bytes: [0u8; 32],
        }
    }

    /// Returns `true` if every digest byte is zero.
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 32]
    }

    /// The algorithm this OID was produced by.
    pub fn algorithm(&self) -> HashAlgorithm {
        if self.len == 20 {
            HashAlgorithm::Sha1
        } else {
            HashAlgorithm::Sha256
        }
    }

    /// Raw digest bytes (20 or 32).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Abbreviated hex (first 8 characters), for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.bytes[..4])
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
