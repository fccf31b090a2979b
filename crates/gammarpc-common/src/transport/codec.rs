//! Binary wire codec
//!
//! Encodes and decodes the four wire primitives (fixed-width integers,
//! Elias-gamma sizes, NUL-terminated strings and payload records) plus the
//! message envelope. All integer fields are signed 64-bit big-endian; all
//! size fields are gamma-coded one byte per bit, so the encoding is
//! independent of the host's endianness and pointer width.
//!
//! # Gamma Coding
//!
//! To encode `v`: let `u = v + 1` (so zero is representable) and
//! `L = floor(log2(u)) + 1`. Emit `L-1` bytes of `0x00`, one byte `0x01`
//! (the unary length marker), then the `L-1` bits of `u` below the implicit
//! leading 1, most significant first, one byte per bit. Total encoded length
//! is `2L - 1` bytes, and the code is monotonic in `v`.
//!
//! # Example
//!
//! ```
//! use gammarpc_common::{Message, Payload, WireBuffer, WireCodec};
//!
//! let msg = Message::call("add2", Payload::with_blob(3, vec![100]));
//! let mut buf = WireCodec::encode_message(&msg).unwrap();
//! assert_eq!(WireCodec::decode_message(&mut buf).unwrap(), msg);
//! ```

use crate::protocol::error::{Result, RpcError};
use crate::protocol::message::{validate_name, Message, Operation, Payload, MAX_NAME_LENGTH};
use crate::transport::buffer::WireBuffer;

/// Stateless codec for the gammarpc wire format.
pub struct WireCodec;

impl WireCodec {
    /// Serialises an envelope into a fresh buffer.
    ///
    /// Validates the envelope first: producers never put a malformed payload
    /// or an out-of-bounds name on the wire.
    pub fn encode_message(msg: &Message) -> Result<WireBuffer> {
        msg.validate()?;
        let mut buf = WireBuffer::new();
        Self::write_i64(&mut buf, msg.request_id);
        Self::write_i64(&mut buf, msg.operation.to_wire());
        Self::write_string(&mut buf, &msg.function_name)?;
        Self::write_payload(&mut buf, &msg.payload)?;
        Ok(buf)
    }

    /// Decodes an envelope from the buffer's read cursor.
    pub fn decode_message(buf: &mut WireBuffer) -> Result<Message> {
        let request_id = Self::read_i64(buf)?;
        let raw_op = Self::read_i64(buf)?;
        let operation =
            Operation::from_wire(raw_op).ok_or(RpcError::UnknownOperation(raw_op))?;
        let function_name = Self::read_string(buf)?;
        let payload = Self::read_payload(buf)?;
        Ok(Message {
            request_id,
            operation,
            function_name,
            payload,
        })
    }

    /// Writes a signed 64-bit big-endian integer.
    pub fn write_i64(buf: &mut WireBuffer, value: i64) {
        buf.write_raw(&value.to_be_bytes());
    }

    /// Reads a signed 64-bit big-endian integer.
    pub fn read_i64(buf: &mut WireBuffer) -> Result<i64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(buf.read_raw(8)?);
        Ok(i64::from_be_bytes(bytes))
    }

    /// Encoded length of `gamma(value)` in bytes: `2 * floor(log2(v+1)) + 1`.
    pub fn gamma_encoded_len(value: u64) -> usize {
        let bits = 64 - (value + 1).leading_zeros() as usize;
        2 * bits - 1
    }

    /// Writes a size as an Elias gamma code, one byte per bit.
    pub fn write_size(buf: &mut WireBuffer, value: u64) {
        let u = value + 1;
        let bits = 64 - u.leading_zeros() as usize;
        buf.reserve(2 * bits - 1);
        for _ in 0..bits - 1 {
            buf.write_byte(0x00);
        }
        buf.write_byte(0x01);
        for i in (0..bits - 1).rev() {
            buf.write_byte(((u >> i) & 1) as u8);
        }
    }

    /// Reads an Elias gamma code back into a size.
    ///
    /// Any byte outside `{0x00, 0x01}` in the code is `Malformed`, as is a
    /// unary prefix long enough to overflow a 64-bit value.
    pub fn read_size(buf: &mut WireBuffer) -> Result<u64> {
        let mut prefix = 0usize;
        loop {
            match buf.read_byte()? {
                0x00 => {
                    prefix += 1;
                    if prefix >= 64 {
                        return Err(RpcError::Malformed(
                            "gamma unary prefix exceeds 64 bits".into(),
                        ));
                    }
                }
                0x01 => break,
                other => {
                    return Err(RpcError::Malformed(format!(
                        "gamma code contains byte {other:#04x}"
                    )))
                }
            }
        }
        let mut value = 1u64;
        for _ in 0..prefix {
            match buf.read_byte()? {
                bit @ (0x00 | 0x01) => value = (value << 1) | u64::from(bit),
                other => {
                    return Err(RpcError::Malformed(format!(
                        "gamma code contains byte {other:#04x}"
                    )))
                }
            }
        }
        Ok(value - 1)
    }

    /// Writes a string as `gamma(len + 1)` followed by the bytes and a NUL
    /// terminator.
    pub fn write_string(buf: &mut WireBuffer, value: &str) -> Result<()> {
        validate_name(value)?;
        Self::write_size(buf, value.len() as u64 + 1);
        buf.write_raw(value.as_bytes());
        buf.write_byte(0);
        Ok(())
    }

    /// Reads a NUL-terminated, length-prefixed string into owned storage.
    pub fn read_string(buf: &mut WireBuffer) -> Result<String> {
        let wire_len = Self::read_size(buf)?;
        if wire_len < 1 || wire_len > MAX_NAME_LENGTH as u64 + 1 {
            return Err(RpcError::Malformed(format!(
                "string length {wire_len} outside 1..={}",
                MAX_NAME_LENGTH + 1
            )));
        }
        let body = buf.read_raw(wire_len as usize - 1)?.to_vec();
        if buf.read_byte()? != 0 {
            return Err(RpcError::Malformed(
                "string is not NUL-terminated within its declared length".into(),
            ));
        }
        if body.contains(&0) {
            return Err(RpcError::Malformed("string contains an interior NUL".into()));
        }
        String::from_utf8(body)
            .map_err(|e| RpcError::Malformed(format!("string is not valid UTF-8: {e}")))
    }

    /// Writes a payload record: scalar, blob length, then the blob bytes
    /// (omitted when the length is zero).
    pub fn write_payload(buf: &mut WireBuffer, payload: &Payload) -> Result<()> {
        if !payload.is_well_formed() {
            return Err(RpcError::InvalidArgument(
                "payload blob is present but empty".into(),
            ));
        }
        Self::write_i64(buf, payload.scalar);
        Self::write_size(buf, payload.blob_len() as u64);
        if let Some(blob) = &payload.blob {
            buf.write_raw(blob);
        }
        Ok(())
    }

    /// Reads a payload record.
    ///
    /// A declared blob length with fewer bytes remaining is `Malformed`; the
    /// error carries the declared and available counts so the fault can be
    /// diagnosed without handing callers a partial blob.
    pub fn read_payload(buf: &mut WireBuffer) -> Result<Payload> {
        let scalar = Self::read_i64(buf)?;
        let blob_len = Self::read_size(buf)?;
        if blob_len == 0 {
            return Ok(Payload::scalar(scalar));
        }
        let available = buf.remaining();
        if (available as u64) < blob_len {
            return Err(RpcError::Malformed(format!(
                "payload blob truncated: declared {blob_len} bytes, {available} available"
            )));
        }
        let blob = buf.read_raw(blob_len as usize)?.to_vec();
        Ok(Payload::with_blob(scalar, blob))
    }
}
