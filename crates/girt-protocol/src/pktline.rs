//! Pkt-line framing: a 4-hex-digit length prefix (counting itself)
//! followed by the data bytes. Length `0000` is the flush packet.

use crate::error::{ProtoError, ProtoResult};

/// Largest legal frame, length prefix included.
pub const MAX_TOTAL: usize = 65520;
/// Largest legal data payload (`MAX_TOTAL - 4`).
pub const MAX_DATA: usize = 65516;
/// The flush packet.
pub const FLUSH_PKT: &[u8; 4] = b"0000";

/// One decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PktFrame {
    Flush,
    Data(Vec<u8>),
}

/// Frame a payload. The length prefix is lowercase hex, zero-padded
/// to four digits.
pub fn make_pkt_line(data: &[u8]) -> ProtoResult<Vec<u8>> {
    if data.len() > MAX_DATA {
        return Err(ProtoError::Framing(format!(
            "payload of {} bytes exceeds the {MAX_DATA}-byte pkt-line limit",
            data.len()
        )));
    }
    let mut out = format!("{:04x}", data.len() + 4).into_bytes();
    out.extend_from_slice(data);
    Ok(out)
}

/// The flush packet as an owned frame.
pub fn flush_pkt() -> Vec<u8> {
    FLUSH_PKT.to_vec()
}

/// Parse a buffer holding exactly one frame.
pub fn parse_pkt_line(frame: &[u8]) -> ProtoResult<PktFrame> {
    let (pkt, consumed) = parse_prefix(frame)?;
    if consumed != frame.len() {
        return Err(ProtoError::Framing(format!(
            "frame declares {consumed} bytes but buffer holds {}",
            frame.len()
        )));
    }
    Ok(pkt)
}

/// Decode a buffer of concatenated frames.
pub fn decode_stream(mut buf: &[u8]) -> ProtoResult<Vec<PktFrame>> {
    let mut frames = Vec::new();
    while !buf.is_empty() {
        let (pkt, consumed) = parse_prefix(buf)?;
        frames.push(pkt);
        buf = &buf[consumed..];
    }
    Ok(frames)
}

/// Parse one frame from the front of a buffer; returns bytes consumed.
fn parse_prefix(buf: &[u8]) -> ProtoResult<(PktFrame, usize)> {
    if buf.len() < 4 {
        return Err(ProtoError::Framing("buffer shorter than a length prefix".into()));
    }
    let prefix = std::str::from_utf8(&buf[..4])
        .map_err(|_| ProtoError::Framing("length prefix is not ASCII hex".into()))?;
    let length = usize::from_str_radix(prefix, 16)
        .map_err(|_| ProtoError::Framing(format!("length prefix is not hex: {prefix:?}")))?;

    if length == 0 {
        return Ok((PktFrame::Flush, 4));
    }
    if length < 4 {
        return Err(ProtoError::Framing(format!("length {length} is inside the prefix")));
    }
    if length > MAX_TOTAL {
        return Err(ProtoError::Framing(format!(
            "length {length} exceeds the {MAX_TOTAL}-byte limit"
        )));
    }
    if buf.len() < length {
        return Err(ProtoError::Framing(format!(
            "frame declares {length} bytes but buffer holds {}",
            buf.len()
        )));
    }
    Ok((PktFrame::Data(buf[4..length].to_vec()), length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn frame_layout() {
        let frame = make_pkt_line(b"hello\n").unwrap();
        assert_eq!(&frame[..4], b"000a");
        assert_eq!(&frame[4..], b"hello\n");
    }

    #[test]
    fn prefix_is_lowercase_hex() {
        let frame = make_pkt_line(&vec![b'x'; 0xab0 - 4]).unwrap();
        assert_eq!(&frame[..4], b"0ab0");
    }

    #[test]
    fn empty_payload_frame() {
        let frame = make_pkt_line(b"").unwrap();
        assert_eq!(frame, b"0004");
        assert_eq!(parse_pkt_line(&frame).unwrap(), PktFrame::Data(Vec::new()));
    }

    #[test]
    fn flush_roundtrip() {
        assert_eq!(parse_pkt_line(FLUSH_PKT).unwrap(), PktFrame::Flush);
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = make_pkt_line(&vec![0u8; MAX_DATA + 1]).unwrap_err();
        assert!(matches!(err, ProtoError::Framing(_)));
        assert!(make_pkt_line(&vec![0u8; MAX_DATA]).is_ok());
    }

    #[test]
    fn mis_sized_frame_rejected() {
        // Declares 8 bytes, holds 6.
        assert!(parse_pkt_line(b"0008ab").is_err());
        // Declares 6 bytes, holds 8.
        assert!(parse_pkt_line(b"0006abcd").is_err());
    }

    #[test]
    fn length_inside_prefix_rejected() {
        assert!(parse_pkt_line(b"0003").is_err());
        assert!(parse_pkt_line(b"0001").is_err());
    }

    #[test]
    fn over_limit_length_rejected() {
        // 0xfff4 == 65524 > MAX_TOTAL.
        let mut buf = b"fff4".to_vec();
        buf.extend_from_slice(&vec![0u8; 65520]);
        assert!(parse_pkt_line(&buf).is_err());
    }

    #[test]
    fn non_hex_prefix_rejected() {
        assert!(parse_pkt_line(b"00zz").is_err());
    }

    #[test]
    fn stream_decoding() {
        let mut buf = make_pkt_line(b"one").unwrap();
        buf.extend_from_slice(&make_pkt_line(b"two").unwrap());
        buf.extend_from_slice(FLUSH_PKT);
        let frames = decode_stream(&buf).unwrap();
        assert_eq!(
            frames,
            vec![
                PktFrame::Data(b"one".to_vec()),
                PktFrame::Data(b"two".to_vec()),
                PktFrame::Flush,
            ]
        );
    }

    proptest! {
        #[test]
        fn roundtrip_any_payload(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let frame = make_pkt_line(&data).unwrap();
            prop_assert_eq!(parse_pkt_line(&frame).unwrap(), PktFrame::Data(data.clone()));
            // First four bytes are the zero-padded hex of |data| + 4.
            let expected = format!("{:04x}", data.len() + 4);
            prop_assert_eq!(&frame[..4], expected.as_bytes());
        }
    }
}
