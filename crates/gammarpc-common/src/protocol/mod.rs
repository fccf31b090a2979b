//! gammarpc Protocol Definitions
//!
//! This module defines the core protocol types for gammarpc: the message
//! envelope, the payload record carried by every request and reply, the four
//! wire operations, and the error type shared by both sides of a connection.
//!
//! # Protocol Types
//!
//! - **[`Message`]**: the envelope: request id, operation, function name and
//!   payload, in that order on the wire
//! - **[`Payload`]**: the `{scalar, blob}` pair carried inside every envelope
//! - **[`Operation`]**: `FIND`, `CALL`, `REPLY_SUCCESS`, `REPLY_FAILURE`
//! - **[`RpcError`]**: every error kind surfaced by the runtime
//!
//! # Request Flow
//!
//! 1. Client sends `FIND(name)`; the server answers `REPLY_SUCCESS` whose
//!    payload scalar is 1 if the name is registered, 0 otherwise
//! 2. Client sends `CALL(name, payload)`; the server dispatches the handler
//!    and answers `REPLY_SUCCESS` with its output, or `REPLY_FAILURE`
//! 3. Replies echo the request's `request_id` unchanged

pub mod error;
pub mod message;

#[cfg(test)]
mod tests;

pub use error::{Result, RpcError};
pub use message::{validate_name, Message, Operation, Payload, MAX_NAME_LENGTH};
