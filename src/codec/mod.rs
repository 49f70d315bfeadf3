//! Packet codec core
//!
//! Wire rules shared by [`PacketCursor`] and [`PacketBuilder`]:
//!
//! ```text
//! bool            1 byte, 0x00 = false, anything else = true
//! byte            1 byte
//! int16 / uint16  2 bytes little-endian
//! int32 / uint32  4 bytes little-endian
//! int64 / uint64  8 bytes little-endian
//! fixed string    n bytes in the configured 8-bit codepage
//! prefixed string int16 length L (signed, little-endian) + L codepage bytes
//! ```

mod builder;
mod cursor;
mod encoding;
mod error;

pub use builder::PacketBuilder;
pub use cursor::PacketCursor;
pub use encoding::{
    Ascii, Codepage, CodepageKind, DecodePolicy, Latin1, TextEncoding, UNMAPPABLE_BYTE,
    Windows1252,
};
pub use error::{Error, Result};

/// Size of the length field in front of a prefixed string
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Longest string a signed 16-bit length prefix can describe
pub const MAX_PREFIXED_STRING_LEN: usize = i16::MAX as usize;

/// Initial capacity of a new builder
pub const DEFAULT_BUILDER_CAPACITY: usize = 64;
