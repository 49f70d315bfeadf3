//! wirepack - packet codec for legacy little-endian game protocols
//!
//! Turns one received packet into typed primitives, and typed primitives back
//! into one packet for sending. Framing, opcode dispatch, and game semantics
//! belong to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use wirepack::{CodecConfig, PacketCursor};
//!
//! let config = CodecConfig::default();
//!
//! // Build a reply
//! let mut reply = config.builder();
//! reply.write_u16(0x000A).write_prefixed_string("welcome").write_i32(1);
//! let bytes = reply.finish();
//!
//! // Read it back
//! let mut cursor: PacketCursor = config.cursor(bytes);
//! assert_eq!(cursor.read_u16()?, 0x000A);
//! assert_eq!(cursor.read_prefixed_string()?, "welcome");
//! assert_eq!(cursor.read_i32()?, 1);
//! # Ok::<(), wirepack::Error>(())
//! ```
//!
//! # Features
//!
//! - **Uniform bounds checks** - every read, one-byte reads included, fails
//!   without moving the cursor
//! - **Pluggable codepages** - strings are single-byte legacy text, not UTF-8
//! - **Zero-copy reads** - raw byte reads are views into the packet
//! - **Capture and replay** - `debug-tools` feature

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

pub mod codec;
pub mod config;
pub mod debug;

pub use codec::{
    Codepage, CodepageKind, DecodePolicy, Error, PacketBuilder, PacketCursor, Result,
    TextEncoding,
};
pub use config::CodecConfig;
pub use debug::{Direction, HexDump, trace_packet};
