//! The loose object envelope: `<type> SP <decimal-size> NUL <payload>`.

use girt_types::ObjectKind;

use crate::error::{OdbError, OdbResult};

/// A decoded loose object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LooseObject {
    pub kind: ObjectKind,
    pub payload: Vec<u8>,
}

/// Frame a payload with the loose header.
pub fn encode_loose(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut out = girt_hash::envelope(kind, payload.len());
    out.extend_from_slice(payload);
    out
}

/// Parse a loose envelope back into kind + payload.
///
/// The declared decimal size must match the remaining byte count
/// exactly.
pub fn decode_loose(bytes: &[u8]) -> OdbResult<LooseObject> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| OdbError::Format("loose header missing NUL".into()))?;
    let header = std::str::from_utf8(&bytes[..nul])
        .map_err(|_| OdbError::Format("loose header is not ASCII".into()))?;
    let (kind_str, size_str) = header
        .split_once(' ')
        .ok_or_else(|| OdbError::Format(format!("loose header missing space: {header:?}")))?;
    let kind = ObjectKind::parse(kind_str)?;
    let size: usize = size_str
        .parse()
        .map_err(|_| OdbError::Format(format!("loose header size not decimal: {size_str:?}")))?;
    let payload = &bytes[nul + 1..];
    if payload.len() != size {
        return Err(OdbError::Format(format!(
            "loose size mismatch: header says {size}, payload is {}",
            payload.len()
        )));
    }
    Ok(LooseObject {
        kind,
        payload: payload.to_vec(),
    })
}
