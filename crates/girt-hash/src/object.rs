use sha1::{Digest, Sha1};
use sha2::Sha256;

use girt_types::{HashAlgorithm, ObjectId, ObjectKind};

/// Build the loose-object envelope header: `<type> SP <size> NUL`.
///
/// `size` is the decimal byte count of the payload that follows.
pub fn envelope(kind: ObjectKind, payload_len: usize) -> Vec<u8> {
    let mut header = Vec::with_capacity(kind.as_str().len() + 24);
    header.extend_from_slice(kind.as_str().as_bytes());
    header.push(b' ');
    header.extend_from_slice(payload_len.to_string().as_bytes());
    header.push(0);
    header
}

/// Compute the OID of an object: digest of envelope ++ payload.
///
/// Pure computation; never touches storage.
pub fn hash_object(kind: ObjectKind, payload: &[u8], algo: HashAlgorithm) -> ObjectId {
    let header = envelope(kind, payload.len());
    let raw: Vec<u8> = match algo {
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(&header);
            hasher.update(payload);
            hasher.finalize().to_vec()
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(&header);
            hasher.update(payload);
            hasher.finalize().to_vec()
        }
    };
    ObjectId::from_raw(&raw).expect("digest width is always 20 or 32")
}
