//! gammarpc Common Types and Transport
//!
//! This crate provides the core protocol definitions and the TCP transport
//! layer for the gammarpc runtime.
//!
//! # Overview
//!
//! gammarpc is a small RPC runtime in which clients resolve remote function
//! names (`FIND`) and invoke them with an opaque payload (`CALL`). This crate
//! contains the pieces shared by the server and client:
//!
//! - **Protocol Layer**: the envelope and payload records, the four wire
//!   operations, and the error type used throughout the system
//! - **Transport Layer**: the self-describing binary codec and the framed
//!   message exchange over a TCP stream
//!
//! # Wire Format
//!
//! Every field on the wire is either a signed 64-bit big-endian integer or an
//! Elias-gamma-coded size (one byte per bit), making the encoding independent
//! of the host's endianness and pointer width. Framed messages are preceded by
//! their gamma-coded byte length, which the receiver echoes back before the
//! body is transmitted.
//!
//! # Components
//!
//! - [`protocol`] - Core protocol types ([`Message`], [`Payload`],
//!   [`Operation`], [`RpcError`])
//! - [`transport`] - Wire buffer, codec and framing
//!
//! # Example
//!
//! ```
//! use gammarpc_common::{Message, Payload};
//!
//! // A request to invoke "add2" with scalar 3 and a one-byte blob.
//! let request = Message::call("add2", Payload::with_blob(3, vec![100]));
//!
//! // A success reply echoing the request id and function name.
//! let reply = Message::reply_success(request.request_id, "add2", Payload::scalar(103));
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
pub use transport::{WireBuffer, WireCodec, MAX_MESSAGE_BYTE_SIZE};
