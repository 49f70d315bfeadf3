//! Append-only packet writer
//!
//! [`PacketBuilder`] mirrors every read on [`PacketCursor`](super::PacketCursor)
//! so that anything written can be read back unchanged.

use bytes::{BufMut, Bytes, BytesMut};

use super::{DEFAULT_BUILDER_CAPACITY, LENGTH_PREFIX_SIZE, MAX_PREFIXED_STRING_LEN, TextEncoding};

/// Growable buffer for one outgoing packet.
///
/// Writes never fail; the buffer grows as needed. [`finish`](Self::finish)
/// consumes the builder, so a finished packet cannot be appended to.
///
/// # Example
///
/// ```
/// use wirepack::{PacketBuilder, PacketCursor};
///
/// let mut builder = PacketBuilder::new();
/// builder.write_u16(0x0011).write_prefixed_string("hello");
///
/// let mut cursor = PacketCursor::new(builder.finish());
/// assert_eq!(cursor.read_u16()?, 0x0011);
/// assert_eq!(cursor.read_prefixed_string()?, "hello");
/// # Ok::<(), wirepack::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    buffer: BytesMut,
    encoding: TextEncoding,
}

impl PacketBuilder {
    /// Create a builder with the default encoding and capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUILDER_CAPACITY)
    }

    /// Create a builder with room for `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_encoding(TextEncoding::default(), capacity)
    }

    /// Create a builder encoding strings with `encoding`
    #[must_use]
    pub fn with_encoding(encoding: TextEncoding, capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            encoding,
        }
    }

    /// Get the text encoding
    #[must_use]
    pub const fn encoding(&self) -> &TextEncoding {
        &self.encoding
    }

    /// Bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// View the bytes written so far
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Write a boolean as `0x00` or `0x01`
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_byte(u8::from(value))
    }

    /// Write one byte
    pub fn write_byte(&mut self, value: u8) -> &mut Self {
        self.buffer.put_u8(value);
        self
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.put_slice(bytes);
        self
    }

    /// Write `count` zero bytes
    pub fn write_zeroes(&mut self, count: usize) -> &mut Self {
        self.buffer.put_bytes(0, count);
        self
    }

    /// Write a signed 16-bit integer
    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.buffer.put_i16_le(value);
        self
    }

    /// Write an unsigned 16-bit integer
    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buffer.put_u16_le(value);
        self
    }

    /// Write a signed 32-bit integer
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buffer.put_i32_le(value);
        self
    }

    /// Write an unsigned 32-bit integer
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buffer.put_u32_le(value);
        self
    }

    /// Write a signed 64-bit integer
    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.buffer.put_i64_le(value);
        self
    }

    /// Write an unsigned 64-bit integer
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.put_u64_le(value);
        self
    }

    /// Write text at its natural encoded width, with no prefix
    pub fn write_string(&mut self, text: &str) -> &mut Self {
        self.encoding.encode_into(text, usize::MAX, &mut self.buffer);
        self
    }

    /// Write text into exactly `width` bytes, truncating or zero-padding
    pub fn write_fixed_string(&mut self, text: &str, width: usize) -> &mut Self {
        let written = self.encoding.encode_into(text, width, &mut self.buffer);
        self.write_zeroes(width - written)
    }

    /// Write an `i16` byte length followed by the encoded text.
    ///
    /// Text longer than `i16::MAX` encoded bytes is truncated.
    pub fn write_prefixed_string(&mut self, text: &str) -> &mut Self {
        let len = self.encoding.encoded_len(text).min(MAX_PREFIXED_STRING_LEN);
        self.buffer.reserve(LENGTH_PREFIX_SIZE + len);
        self.buffer.put_i16_le(len as i16);
        self.encoding.encode_into(text, len, &mut self.buffer);
        self
    }

    /// Copy out everything written so far
    #[must_use]
    pub fn to_buffer(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buffer)
    }

    /// Freeze the buffer for transport
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }
}
