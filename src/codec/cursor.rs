//! Bounds-checked packet reader
//!
//! A [`PacketCursor`] owns one received packet and hands out little-endian
//! primitives from the front of it. Every read checks bounds before it
//! consumes anything: a failed read leaves the position exactly where it was.

use std::ops::Range;

use bytes::Bytes;

use super::{Error, Result, TextEncoding};

/// Sequential reader over one received packet.
///
/// # Lifecycle
///
/// The cursor is active from construction until [`release`](Self::release)
/// is called or it is dropped. Once released, every read, skip, and accessor
/// returns [`Error::Released`].
///
/// # Example
///
/// ```
/// use wirepack::PacketCursor;
///
/// let mut cursor = PacketCursor::new(&b"\x05\x00hello"[..]);
/// assert_eq!(cursor.read_prefixed_string()?, "hello");
/// assert_eq!(cursor.position()?, 7);
/// # Ok::<(), wirepack::Error>(())
/// ```
#[derive(Debug)]
pub struct PacketCursor {
    buffer: Option<Bytes>,
    position: usize,
    encoding: TextEncoding,
    max_string_len: Option<usize>,
}

impl PacketCursor {
    /// Create a cursor using the default text encoding
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self::with_encoding(buffer, TextEncoding::default())
    }

    /// Create a cursor decoding strings with `encoding`
    pub fn with_encoding(buffer: impl Into<Bytes>, encoding: TextEncoding) -> Self {
        Self {
            buffer: Some(buffer.into()),
            position: 0,
            encoding,
            max_string_len: None,
        }
    }

    /// Cap the length accepted by [`read_prefixed_string`](Self::read_prefixed_string)
    #[must_use]
    pub fn with_max_string_len(mut self, max: Option<usize>) -> Self {
        self.max_string_len = max;
        self
    }

    /// Get the text encoding
    #[must_use]
    pub const fn encoding(&self) -> &TextEncoding {
        &self.encoding
    }

    /// Current read offset
    pub fn position(&self) -> Result<usize> {
        self.active().map(|_| self.position)
    }

    /// Bytes left to read
    pub fn remaining(&self) -> Result<usize> {
        self.active().map(|buffer| buffer.len() - self.position)
    }

    /// Total packet length
    pub fn len(&self) -> Result<usize> {
        self.active().map(Bytes::len)
    }

    /// Check whether the packet holds no bytes at all
    pub fn is_empty(&self) -> Result<bool> {
        self.active().map(Bytes::is_empty)
    }

    /// The whole packet, independent of how much has been read
    pub fn to_buffer(&self) -> Result<Bytes> {
        self.active().cloned()
    }

    /// Check whether the buffer has been released
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// Drop the buffer handle. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        self.buffer = None;
    }

    /// Read a boolean (any non-zero byte is `true`)
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_byte().map(|byte| byte != 0)
    }

    /// Read one byte
    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_array::<1>().map(|[byte]| byte)
    }

    /// Read `count` raw bytes without copying
    pub fn read_bytes(&mut self, count: usize) -> Result<Bytes> {
        let range = self.claim(requested(count))?;
        self.active().map(|buffer| buffer.slice(range))
    }

    /// Read a signed 16-bit integer
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Read an unsigned 16-bit integer
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a signed 32-bit integer
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read an unsigned 32-bit integer
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a signed 64-bit integer
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Read an unsigned 64-bit integer
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Read `count` bytes and decode them as text
    pub fn read_fixed_string(&mut self, count: usize) -> Result<String> {
        let start = self.position;
        self.decode_span(start, requested(count))
    }

    /// Read `count` bytes, keeping only the text before the first NUL
    pub fn read_padded_string(&mut self, count: usize) -> Result<String> {
        let start = self.position;
        let range = self.claim(requested(count))?;
        let raw = self.active()?.slice(range);
        let end = raw.iter().position(|&byte| byte == 0).unwrap_or(raw.len());
        let result = self.encoding.decode(&raw[..end], start);
        if result.is_err() {
            self.position = start;
        }
        result
    }

    /// Read an `i16` length followed by that many bytes of text.
    ///
    /// A negative length is rejected as [`Error::OutOfRange`]. On any failure
    /// the length prefix is not consumed either.
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let start = self.position;
        let len = self.read_i16()?;

        if let (Some(max), Ok(len)) = (self.max_string_len, usize::try_from(len)) {
            if len > max {
                self.position = start;
                return Err(Error::StringTooLong { len, max });
            }
        }

        self.decode_span(start, i64::from(len))
    }

    /// Advance past `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.claim(requested(count)).map(|_| ())
    }

    fn active(&self) -> Result<&Bytes> {
        self.buffer.as_ref().ok_or(Error::Released)
    }

    /// Reserve `requested` bytes at the current position and advance past them.
    fn claim(&mut self, requested: i64) -> Result<Range<usize>> {
        let remaining = self.remaining()?;
        let count = usize::try_from(requested)
            .ok()
            .filter(|count| *count <= remaining)
            .ok_or(Error::OutOfRange {
                position: self.position,
                requested,
                remaining,
            })?;

        let start = self.position;
        self.position += count;
        Ok(start..self.position)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let range = self.claim(N as i64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.active()?[range]);
        Ok(out)
    }

    /// Decode `requested` bytes as text, rewinding to `rewind_to` on failure.
    fn decode_span(&mut self, rewind_to: usize, requested: i64) -> Result<String> {
        let result = self.claim(requested).and_then(|range| {
            let offset = range.start;
            let raw = self.active()?.slice(range);
            self.encoding.decode(&raw, offset)
        });
        if result.is_err() && self.buffer.is_some() {
            self.position = rewind_to;
        }
        result
    }
}

impl Drop for PacketCursor {
    fn drop(&mut self) {
        self.release();
    }
}

fn requested(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
