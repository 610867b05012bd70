//! Raw-DEFLATE compression with inflation-bomb guards.
//!
//! Loose objects are stored as raw DEFLATE streams (no zlib header).
//! Inflation enforces both an absolute output cap and an output/input
//! ratio cap so a hostile object cannot exhaust memory.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::{OdbError, OdbResult};

/// Maximum delta chain depth accepted by pack consumers.
pub const MAX_DELTA_CHAIN_DEPTH: usize = 50;

/// Guards applied while inflating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InflateLimits {
    /// Hard cap on inflated output size in bytes.
    pub max_inflated_bytes: usize,
    /// Cap on `inflated / max(compressed, 1)`.
    pub max_inflate_ratio: usize,
}

impl Default for InflateLimits {
    fn default() -> Self {
        Self {
            max_inflated_bytes: 134_217_728,
            max_inflate_ratio: 200,
        }
    }
}

/// Compress `bytes` as a raw DEFLATE stream.
pub fn deflate_raw(bytes: &[u8]) -> OdbResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Inflate a raw DEFLATE stream under `limits`.
///
/// Output beyond `max_inflated_bytes`, or a ratio above
/// `max_inflate_ratio`, aborts with an integrity error. On error the
/// partial output is discarded.
pub fn inflate_raw(bytes: &[u8], limits: InflateLimits) -> OdbResult<Vec<u8>> {
    let ratio_cap = limits
        .max_inflate_ratio
        .saturating_mul(bytes.len().max(1));
    let cap = limits.max_inflated_bytes.min(ratio_cap);

    let mut decompress = Decompress::new(false);
    let mut out = Vec::new();
    let mut buf = [0u8; 16 * 1024];
    let mut in_pos = 0usize;

    loop {
        let before_in = decompress.total_in() as usize;
        let before_out = decompress.total_out() as usize;

        let status = decompress
            .decompress(&bytes[in_pos..], &mut buf, FlushDecompress::None)
            .map_err(|e| OdbError::Format(format!("deflate stream corrupt: {e}")))?;

        let consumed = decompress.total_in() as usize - before_in;
        let produced = decompress.total_out() as usize - before_out;
        in_pos += consumed;

        if produced != 0 {
            if out.len() + produced > cap {
                return Err(OdbError::Integrity(format!(
                    "inflation limit exceeded: output would pass {cap} bytes \
                     (max {} bytes, ratio {})",
                    limits.max_inflated_bytes, limits.max_inflate_ratio
                )));
            }
            out.extend_from_slice(&buf[..produced]);
        }

        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                if consumed == 0 && produced == 0 {
                    return Err(OdbError::Format("truncated deflate stream".into()));
                }
            }
        }
    }
}
