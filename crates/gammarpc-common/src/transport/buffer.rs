//! Growable wire buffer
//!
//! A contiguous byte region with a write end and a read cursor. Writes
//! reserve first and grow the backing storage by repeated doubling; reads
//! advance the cursor and fail with `ShortInput` rather than run past the
//! produced region.

use crate::protocol::error::{Result, RpcError};

/// Initial capacity of a freshly created buffer.
const INITIAL_BUFFER_SIZE: usize = 32;

/// Append-only serialisation sink with a cursor-based read side.
///
/// The produced region is `data[..data.len()]`; `read_pos` tracks how much of
/// it has been consumed. Growth is doubling-only, so a serialisation pass
/// performs O(log n) reallocations.
///
/// # Example
///
/// ```
/// use gammarpc_common::WireBuffer;
///
/// let mut buf = WireBuffer::new();
/// buf.write_raw(&[1, 2, 3]);
/// assert_eq!(buf.len(), 3);
/// assert_eq!(buf.read_raw(2).unwrap(), &[1, 2]);
/// assert_eq!(buf.remaining(), 1);
/// ```
#[derive(Debug)]
pub struct WireBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Default for WireBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl WireBuffer {
    /// Creates an empty buffer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_BUFFER_SIZE)
    }

    /// Creates an empty buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        WireBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Wraps received bytes for decoding; the read cursor starts at 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        WireBuffer { data, read_pos: 0 }
    }

    /// Number of produced bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Produced bytes not yet consumed by the read side.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// The full produced region.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning the produced bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Ensures capacity for `additional` more bytes, growing by repeated
    /// doubling.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed <= self.data.capacity() {
            return;
        }
        let mut capacity = self.data.capacity().max(INITIAL_BUFFER_SIZE);
        while capacity < needed {
            capacity *= 2;
        }
        self.data.reserve_exact(capacity - self.data.len());
    }

    /// Appends `bytes` to the produced region.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Appends a single byte to the produced region.
    pub fn write_byte(&mut self, byte: u8) {
        self.reserve(1);
        self.data.push(byte);
    }

    /// Consumes and returns the next `n` produced bytes.
    ///
    /// Fails with `ShortInput` if fewer than `n` bytes remain; the cursor is
    /// not advanced on failure.
    pub fn read_raw(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(RpcError::ShortInput {
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.data[start..self.read_pos])
    }

    /// Consumes and returns the next produced byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_raw(1)?[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let mut buf = WireBuffer::new();
        buf.write_raw(b"hello");
        buf.write_byte(b'!');
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.read_raw(5).unwrap(), b"hello");
        assert_eq!(buf.read_byte().unwrap(), b'!');
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_read_past_produced_region_fails() {
        let mut buf = WireBuffer::from_vec(vec![1, 2]);
        assert_eq!(buf.read_byte().unwrap(), 1);
        match buf.read_raw(2) {
            Err(RpcError::ShortInput { needed, available }) => {
                assert_eq!(needed, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected ShortInput, got {:?}", other.map(<[u8]>::to_vec)),
        }
        // cursor must not have moved
        assert_eq!(buf.read_byte().unwrap(), 2);
    }

    #[test]
    fn test_growth_is_doubling() {
        let mut buf = WireBuffer::new();
        assert_eq!(buf.as_slice().len(), 0);
        // 33 bytes forces one doubling past the initial 32
        buf.write_raw(&[0u8; 33]);
        assert_eq!(buf.len(), 33);
        buf.write_raw(&[0u8; 100]);
        assert_eq!(buf.len(), 133);
    }

    #[test]
    fn test_from_vec_reads_from_start() {
        let mut buf = WireBuffer::from_vec(vec![9, 8, 7]);
        assert_eq!(buf.remaining(), 3);
        assert_eq!(buf.read_raw(3).unwrap(), &[9, 8, 7]);
    }
}
