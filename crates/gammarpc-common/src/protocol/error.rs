use thiserror::Error;

/// Every error kind surfaced by the gammarpc core.
///
/// Propagation policy: grammar and transport errors (`Malformed`, `Oversize`,
/// `FramingMismatch`, `Io`, `Closed`) terminate the connection they occurred
/// on. Dispatch failures (`HandlerAbsent`, `HandlerFailed`) are answered with
/// a `REPLY_FAILURE` envelope and never tear the connection down.
/// `InvalidArgument` is a local fail-fast and is never transmitted.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed wire data: {0}")]
    Malformed(String),

    #[error("message too large: {size} bytes (max {max} bytes)")]
    Oversize { size: u64, max: u64 },

    #[error("framing mismatch: sent size {sent}, peer echoed {echoed}")]
    FramingMismatch { sent: u64, echoed: u64 },

    #[error("short input: needed {needed} bytes, {available} available")]
    ShortInput { needed: usize, available: usize },

    #[error("unknown operation discriminant {0}")]
    UnknownOperation(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("no handler registered for '{0}'")]
    HandlerAbsent(String),

    #[error("handler for '{0}' returned no usable payload")]
    HandlerFailed(String),
}

pub type Result<T> = std::result::Result<T, RpcError>;
