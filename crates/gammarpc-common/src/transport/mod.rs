//! gammarpc Transport Layer
//!
//! This module provides the wire buffer, the binary codec and the framed
//! message exchange over a TCP stream.
//!
//! # Architecture
//!
//! - **[`WireBuffer`]**: append-only serialisation sink with doubling growth
//!   and a cursor-based read side
//! - **[`WireCodec`]**: the four wire primitives (big-endian i64, Elias-gamma
//!   size, NUL-terminated string, payload record) and the envelope
//! - **[`framing`]**: the size handshake and short-read/short-write loops
//!
//! # Wire Format
//!
//! ```text
//! Envelope := Int64  request_id
//!          || Int64  operation
//!          || Gamma  name_len          (bytes, includes trailing NUL)
//!          || Bytes[name_len]  name    (NUL-terminated)
//!          || Int64  payload.scalar
//!          || Gamma  blob_len
//!          || Bytes[blob_len]  blob    (omitted iff blob_len == 0)
//!
//! Framed  := Gamma  N
//!          || Gamma  N_echo            (receiver back to sender)
//!          || Bytes[N]  envelope
//! ```
//!
//! # Message Size Limits
//!
//! Framed messages are capped at [`MAX_MESSAGE_BYTE_SIZE`] (1,000,000 bytes),
//! which bounds the gamma size prefix to 39 encoded bytes.

pub mod buffer;
pub mod codec;
pub mod framing;


pub use buffer::WireBuffer;
pub use codec::WireCodec;
pub use framing::{receive_message, request, send_message};

/// Maximum size of a framed message in bytes.
///
/// With Elias gamma coding the size prefix for any legal message fits in
/// `2 * floor(log2(1_000_000)) + 1 = 39` encoded bytes.
pub const MAX_MESSAGE_BYTE_SIZE: u64 = 1_000_000;

/// Upper bound on the encoded length of a legal gamma size prefix.
pub const GAMMA_MAX_ENCODED_BYTES: usize = 39;
