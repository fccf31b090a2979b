//! Framed message exchange
//!
//! A message on the stream is preceded by its encoded byte length as an
//! Elias-gamma size. The receiver echoes the size bytes it consumed back to
//! the sender, and only on byte-equal confirmation does the sender transmit
//! the body. The handshake catches desynchronisation before a large body is
//! wasted on a confused peer.
//!
//! ```text
//! sender                    receiver
//!   | -- gamma(N) ----------> |
//!   | <--------- gamma(N) -- |   (echo of the exact bytes consumed)
//!   | -- body[N] -----------> |
//! ```
//!
//! All reads and writes loop around the stream primitive until the requested
//! byte count is transferred: the OS may transfer fewer bytes than asked.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use crate::protocol::error::{Result, RpcError};
use crate::protocol::message::Message;
use crate::transport::buffer::WireBuffer;
use crate::transport::codec::WireCodec;
use crate::transport::{GAMMA_MAX_ENCODED_BYTES, MAX_MESSAGE_BYTE_SIZE};

/// Sends one framed message.
///
/// Serialises the envelope, rejects it if it exceeds
/// [`MAX_MESSAGE_BYTE_SIZE`], performs the size handshake, then writes the
/// body.
///
/// # Errors
///
/// `Oversize` for a too-large envelope, `FramingMismatch` when the peer
/// echoes a different size, `Closed`/`Io` on connection loss.
pub fn send_message(stream: &mut TcpStream, msg: &Message) -> Result<()> {
    let body = WireCodec::encode_message(msg)?;
    let size = body.len() as u64;
    if size > MAX_MESSAGE_BYTE_SIZE {
        return Err(RpcError::Oversize {
            size,
            max: MAX_MESSAGE_BYTE_SIZE,
        });
    }

    let mut prefix = WireBuffer::new();
    WireCodec::write_size(&mut prefix, size);
    tracing::trace!(size, "sending frame size");
    write_bytes(stream, prefix.as_slice())?;

    // the peer echoes the size bytes it decoded before we commit the body
    let mut echo = vec![0u8; prefix.len()];
    read_bytes(stream, &mut echo)?;
    let echoed = WireCodec::read_size(&mut WireBuffer::from_vec(echo))?;
    if echoed != size {
        return Err(RpcError::FramingMismatch {
            sent: size,
            echoed,
        });
    }

    write_bytes(stream, body.as_slice())?;
    Ok(())
}

/// Receives one framed message.
///
/// Reads the gamma size prefix byte-at-a-time (at most 39 bytes), rejects
/// oversize frames, echoes the exact prefix bytes back, then reads and
/// decodes the body.
pub fn receive_message(stream: &mut TcpStream) -> Result<Message> {
    let (size, prefix) = read_size_prefix(stream)?;
    if size > MAX_MESSAGE_BYTE_SIZE {
        tracing::warn!(size, "rejecting oversize frame");
        return Err(RpcError::Oversize {
            size,
            max: MAX_MESSAGE_BYTE_SIZE,
        });
    }

    tracing::trace!(size, "confirming frame size");
    write_bytes(stream, &prefix)?;

    let mut body = vec![0u8; size as usize];
    read_bytes(stream, &mut body)?;
    WireCodec::decode_message(&mut WireBuffer::from_vec(body))
}

/// Sends a request and waits for the single matching reply.
pub fn request(stream: &mut TcpStream, msg: &Message) -> Result<Message> {
    send_message(stream, msg)?;
    receive_message(stream)
}

/// Reads a gamma size prefix from the stream, returning the decoded value
/// together with the exact bytes consumed (for the echo).
///
/// The legal prefix for any frame within the message size limit is at most
/// [`GAMMA_MAX_ENCODED_BYTES`] long; anything longer is rejected without
/// reading further.
fn read_size_prefix(stream: &mut TcpStream) -> Result<(u64, Vec<u8>)> {
    let mut raw = Vec::with_capacity(GAMMA_MAX_ENCODED_BYTES);
    let max_prefix_zeros = GAMMA_MAX_ENCODED_BYTES / 2;

    // unary part: zeros up to the 0x01 marker
    loop {
        let byte = read_one(stream)?;
        raw.push(byte);
        match byte {
            0x01 => break,
            0x00 => {
                if raw.len() > max_prefix_zeros {
                    return Err(RpcError::Malformed(format!(
                        "gamma size prefix exceeds {GAMMA_MAX_ENCODED_BYTES} bytes"
                    )));
                }
            }
            other => {
                return Err(RpcError::Malformed(format!(
                    "gamma size prefix contains byte {other:#04x}"
                )))
            }
        }
    }

    // one significant bit per leading zero
    let significant = raw.len() - 1;
    for _ in 0..significant {
        raw.push(read_one(stream)?);
    }

    let value = WireCodec::read_size(&mut WireBuffer::from_vec(raw.clone()))?;
    Ok((value, raw))
}

fn read_one(stream: &mut TcpStream) -> Result<u8> {
    let mut byte = [0u8; 1];
    read_bytes(stream, &mut byte)?;
    Ok(byte[0])
}

/// Writes the whole of `bytes`, looping around short writes.
pub(crate) fn write_bytes(stream: &mut TcpStream, bytes: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        match stream.write(&bytes[written..]) {
            Ok(0) => return Err(RpcError::Closed),
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io_error(e)),
        }
    }
    stream.flush()?;
    Ok(())
}

/// Fills the whole of `buf`, looping around short reads.
pub(crate) fn read_bytes(stream: &mut TcpStream, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(RpcError::Closed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io_error(e)),
        }
    }
    Ok(())
}

/// Folds connection-teardown error kinds into `Closed`; everything else
/// stays `Io`.
fn map_io_error(err: std::io::Error) -> RpcError {
    match err.kind() {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::UnexpectedEof => RpcError::Closed,
        _ => RpcError::Io(err),
    }
}
