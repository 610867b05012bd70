//! The client-visible wire protocol core.
//!
//! Pkt-line framing, capability negotiation and the receive-pack
//! advertisement/request shapes. Pack data transport and server-side
//! upload-pack negotiation live elsewhere; this crate only frames.

pub mod caps;
pub mod error;
pub mod http;
pub mod pktline;
pub mod receive;

pub use caps::{capability_parity, check_filter_support, normalize_capabilities};
pub use error::{ProtoError, ProtoResult};
pub use http::discovery_service;
pub use pktline::{
    decode_stream, flush_pkt, make_pkt_line, parse_pkt_line, PktFrame, FLUSH_PKT, MAX_DATA,
    MAX_TOTAL,
};
pub use receive::{advertise_refs, build_update_request, default_capabilities};
