//! Packet inspection helpers for dispatchers and tooling.
//!
//! The codec itself never logs. Callers that want packet traffic in their logs
//! use [`trace_packet`] or format a buffer with [`HexDump`].

use std::fmt;

use bytes::Bytes;
use tracing::{Level, trace};

use crate::codec::PacketCursor;

#[cfg(feature = "debug-tools")]
mod capture;

#[cfg(feature = "debug-tools")]
pub use capture::{CapturedPacket, PacketRecorder, ReplayReader};

/// Bytes shown by [`HexDump`] before it elides the rest.
pub const HEX_DUMP_LIMIT: usize = 256;

/// Which way a packet travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Client to server
    Inbound = 0x01,
    /// Server to client
    Outbound = 0x02,
}

impl Direction {
    /// Convert from byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Inbound),
            0x02 => Some(Self::Outbound),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// Space-separated hex rendering of a buffer, for log fields.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    bytes: &'a [u8],
    limit: usize,
}

impl<'a> HexDump<'a> {
    /// Dump up to [`HEX_DUMP_LIMIT`] bytes
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self::with_limit(bytes, HEX_DUMP_LIMIT)
    }

    /// Dump up to `limit` bytes
    #[must_use]
    pub const fn with_limit(bytes: &'a [u8], limit: usize) -> Self {
        Self { bytes, limit }
    }
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.bytes.len().min(self.limit);
        for (index, byte) in self.bytes[..shown].iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        if shown < self.bytes.len() {
            write!(f, " ... (+{} bytes)", self.bytes.len() - shown)?;
        }
        Ok(())
    }
}

/// Emit a trace event describing one packet.
///
/// The leading little-endian `u16` is reported as the opcode when present.
pub fn trace_packet(direction: Direction, packet: &Bytes) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }

    let opcode = PacketCursor::new(packet.clone()).read_u16().ok();
    trace!(
        %direction,
        opcode = ?opcode,
        len = packet.len(),
        bytes = %HexDump::new(packet),
        "packet"
    );
}
