//! Codec error types

use thiserror::Error;

/// Errors raised while decoding a packet.
///
/// The write path has no variant of its own: appending to a builder only fails
/// when the allocator does.
#[derive(Error, Debug)]
pub enum Error {
    /// A read, skip, or length prefix asked for more bytes than remain
    #[error("out of range: requested {requested} bytes at offset {position}, {remaining} remaining")]
    OutOfRange {
        /// Cursor position at the time of the request
        position: usize,
        /// Number of bytes requested (negative for a bad length prefix)
        requested: i64,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A byte has no mapping in the configured codepage
    #[error("malformed encoding: byte {byte:#04x} at offset {offset} is not valid in {codepage}")]
    MalformedEncoding {
        /// Offending byte
        byte: u8,
        /// Absolute offset of the byte within the packet
        offset: usize,
        /// Codepage name
        codepage: &'static str,
    },

    /// A length-prefixed string exceeds the configured maximum
    #[error("string too long: {len} bytes (max {max})")]
    StringTooLong {
        /// Length read from the prefix
        len: usize,
        /// Maximum allowed
        max: usize,
    },

    /// The cursor was used after its buffer was released
    #[error("packet cursor used after release")]
    Released,

    /// A captured packet record failed its checksum
    #[error("corrupt capture record: expected checksum {expected:#x}, got {found:#x}")]
    CorruptRecord {
        /// Checksum computed over the record contents
        expected: u64,
        /// Checksum stored in the record
        found: u64,
    },

    /// IO error from capture or replay files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check whether this is a bounds failure
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
