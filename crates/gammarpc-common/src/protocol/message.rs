//! gammarpc Message Types
//!
//! This module defines the payload record, the wire operations and the
//! message envelope, together with the constructors the server and client
//! build their traffic from.

use crate::protocol::error::{Result, RpcError};

/// Maximum length of a function name in bytes, excluding the wire
/// terminator.
pub const MAX_NAME_LENGTH: usize = 1000;

/// Placeholder carried in the name field of synthesised failure replies.
/// Receivers must not attach meaning to the name on `REPLY_FAILURE`.
pub(crate) const FAILURE_NAME: &str = "?";

/// The payload carried by every request and reply.
///
/// A payload is a user-assigned signed scalar plus an optional byte blob.
/// `blob` is `None` exactly when the wire carries a blob length of zero;
/// `Some(bytes)` with an empty `bytes` is the malformed state producers must
/// reject before transmission.
///
/// # Example
///
/// ```
/// use gammarpc_common::Payload;
///
/// let vacuous = Payload::scalar(0);
/// assert!(vacuous.is_well_formed());
/// assert_eq!(vacuous.blob_len(), 0);
///
/// let with_blob = Payload::with_blob(3, vec![100]);
/// assert_eq!(with_blob.blob_len(), 1);
///
/// let malformed = Payload::new(0, Some(vec![]));
/// assert!(!malformed.is_well_formed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// User-assigned scalar value
    pub scalar: i64,
    /// Optional byte blob; `None` means a blob length of zero on the wire
    pub blob: Option<Vec<u8>>,
}

impl Payload {
    /// Creates a payload from its parts without validating them.
    ///
    /// Use [`Payload::is_well_formed`] before handing the result to the
    /// transport; senders reject malformed payloads locally.
    pub fn new(scalar: i64, blob: Option<Vec<u8>>) -> Self {
        Payload { scalar, blob }
    }

    /// Creates a blob-less payload carrying only a scalar.
    pub fn scalar(scalar: i64) -> Self {
        Payload { scalar, blob: None }
    }

    /// Creates a payload carrying a scalar and a blob.
    pub fn with_blob(scalar: i64, blob: Vec<u8>) -> Self {
        Payload {
            scalar,
            blob: Some(blob),
        }
    }

    /// Number of blob bytes this payload carries.
    pub fn blob_len(&self) -> usize {
        self.blob.as_ref().map_or(0, Vec::len)
    }

    /// Whether the blob satisfies the `length == 0 ⇔ absent` invariant.
    pub fn is_well_formed(&self) -> bool {
        self.blob.as_ref().is_none_or(|b| !b.is_empty())
    }
}

/// The four wire operations.
///
/// Serialised as a signed 64-bit big-endian integer. Unknown discriminants
/// surface as [`RpcError::UnknownOperation`] so a server can log and ignore
/// them without tearing down the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Ask whether a function name is registered
    Find,
    /// Invoke a registered function
    Call,
    /// Successful reply carrying the result payload
    ReplySuccess,
    /// Failure reply; the payload is vacuous and the name is a placeholder
    ReplyFailure,
}

impl Operation {
    /// Wire discriminant of this operation.
    pub fn to_wire(self) -> i64 {
        match self {
            Operation::Find => 0,
            Operation::Call => 1,
            Operation::ReplySuccess => 2,
            Operation::ReplyFailure => 3,
        }
    }

    /// Maps a wire discriminant back to an operation.
    pub fn from_wire(value: i64) -> Option<Operation> {
        match value {
            0 => Some(Operation::Find),
            1 => Some(Operation::Call),
            2 => Some(Operation::ReplySuccess),
            3 => Some(Operation::ReplyFailure),
            _ => None,
        }
    }
}

/// The message envelope.
///
/// Every wire message decodes to exactly these four fields, in this order:
/// request id, operation, function name, payload. The payload is always
/// present; when semantically vacuous it carries `{scalar: 0, blob: None}`.
///
/// `request_id` is opaque to the protocol and echoed unchanged in replies.
/// The current client assigns 0 on every send, but the echo contract keeps
/// future pipelining possible without a wire change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Opaque request identifier, echoed unchanged in replies
    pub request_id: i64,
    /// What the sender wants done
    pub operation: Operation,
    /// Target function name (1..=1000 bytes)
    pub function_name: String,
    /// The payload; always present
    pub payload: Payload,
}

impl Message {
    /// Creates a message from its parts.
    pub fn new(
        request_id: i64,
        operation: Operation,
        function_name: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Message {
            request_id,
            operation,
            function_name: function_name.into(),
            payload,
        }
    }

    /// Creates a `FIND` request for `name` with a vacuous payload.
    pub fn find(name: impl Into<String>) -> Self {
        Message::new(0, Operation::Find, name, Payload::scalar(0))
    }

    /// Creates a `CALL` request for `name` carrying `payload`.
    pub fn call(name: impl Into<String>, payload: Payload) -> Self {
        Message::new(0, Operation::Call, name, payload)
    }

    /// Creates a `REPLY_SUCCESS` envelope echoing `request_id` and `name`.
    pub fn reply_success(request_id: i64, name: impl Into<String>, payload: Payload) -> Self {
        Message::new(request_id, Operation::ReplySuccess, name, payload)
    }

    /// Creates the synthesised `REPLY_FAILURE` envelope.
    ///
    /// The name field is a fixed placeholder and the payload is vacuous;
    /// only the operation and the echoed request id are meaningful.
    pub fn failure(request_id: i64) -> Self {
        Message::new(
            request_id,
            Operation::ReplyFailure,
            FAILURE_NAME,
            Payload::scalar(0),
        )
    }

    /// Checks the envelope against the protocol invariants: name bounds and
    /// the payload blob invariant.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.function_name)?;
        if !self.payload.is_well_formed() {
            return Err(RpcError::InvalidArgument(
                "payload blob is present but empty".into(),
            ));
        }
        Ok(())
    }
}

/// Validates a function name: 1..=1000 bytes, no interior NUL (the wire form
/// is NUL-terminated).
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(RpcError::InvalidArgument(format!(
            "function name must be 1..={} bytes, got {}",
            MAX_NAME_LENGTH,
            name.len()
        )));
    }
    if name.as_bytes().contains(&0) {
        return Err(RpcError::InvalidArgument(
            "function name contains a NUL byte".into(),
        ));
    }
    Ok(())
}
