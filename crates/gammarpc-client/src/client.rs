//! Blocking RPC client
//!
//! Owns one TCP connection to a server. Requests are issued strictly one at
//! a time; the single matching reply is awaited before control returns.

use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use gammarpc_common::transport::framing;
use gammarpc_common::{validate_name, Message, Operation, Payload, Result, RpcError};

use crate::handle::Handle;

/// Timeout for each connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A blocking client for one gammarpc server.
///
/// After any transport error (`Io`, `Closed`, `Malformed`, framing faults)
/// the connection state is undefined and the client should be closed;
/// subsequent requests fail with `Closed`.
pub struct Client {
    stream: Option<TcpStream>,
}

impl Client {
    /// Connects to a server.
    ///
    /// The address is resolved via [`ToSocketAddrs`]; each candidate is
    /// tried with a per-attempt timeout until one accepts.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gammarpc_client::Client;
    ///
    /// let client = Client::connect("[::1]:3000").unwrap();
    /// ```
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let mut last_err = None;
        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    tracing::debug!(%candidate, "connected");
                    return Ok(Client {
                        stream: Some(stream),
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => RpcError::Io(e),
            None => RpcError::InvalidArgument("address resolved to nothing".into()),
        })
    }

    /// Resolves a remote function name.
    ///
    /// Returns `Ok(Some(handle))` iff the server answered `REPLY_SUCCESS`
    /// with an existence flag of 1, `Ok(None)` when the name is not
    /// registered, and `Err` on invalid names or transport faults.
    pub fn find(&mut self, name: &str) -> Result<Option<Handle>> {
        validate_name(name)?;
        let stream = self.stream_mut()?;
        let reply = framing::request(stream, &Message::find(name))?;
        match reply.operation {
            Operation::ReplySuccess if reply.payload.scalar == 1 => Handle::new(name).map(Some),
            _ => Ok(None),
        }
    }

    /// Invokes a previously resolved remote function.
    ///
    /// Returns `Ok(Some(payload))` with the handler's output on
    /// `REPLY_SUCCESS` and `Ok(None)` when the server answered
    /// `REPLY_FAILURE`. Malformed payloads are rejected locally before
    /// anything is sent.
    pub fn call(&mut self, handle: &Handle, payload: &Payload) -> Result<Option<Payload>> {
        if !payload.is_well_formed() {
            return Err(RpcError::InvalidArgument(
                "payload blob is present but empty".into(),
            ));
        }
        let stream = self.stream_mut()?;
        let msg = Message::call(handle.name(), payload.clone());
        let reply = framing::request(stream, &msg)?;
        match reply.operation {
            Operation::ReplySuccess => Ok(Some(reply.payload)),
            _ => Ok(None),
        }
    }

    /// Tears down the connection. Idempotent: closing an already-closed
    /// client is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            tracing::debug!("closing connection");
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Whether `close` has been called (or the client never connected).
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(RpcError::Closed)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}
