//! Packet capture files for offline replay.
//!
//! # Format
//!
//! ```text
//! header  "WPKC" | version u16
//! record  direction u8 | timestamp_us u64 | len u32 | payload | xxh3 u64
//! ```
//!
//! All integers are little-endian. The checksum covers the record from the
//! direction byte through the payload.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use super::Direction;
use crate::codec::{Error, PacketBuilder, PacketCursor, Result};
use crate::config::CodecConfig;

const CAPTURE_MAGIC: &[u8; 4] = b"WPKC";
const CAPTURE_VERSION: u16 = 1;
const RECORD_OVERHEAD: usize = 1 + 8 + 4 + 8;

/// Thread-safe appender of captured packets.
#[derive(Clone)]
pub struct PacketRecorder {
    inner: Arc<Mutex<File>>,
}

impl PacketRecorder {
    /// Create a recorder that writes to the provided path, truncating any existing file.
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)?;
        let mut header = PacketBuilder::with_capacity(CAPTURE_MAGIC.len() + 2);
        header.write_bytes(CAPTURE_MAGIC).write_u16(CAPTURE_VERSION);
        file.write_all(header.as_slice())?;

        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }

    /// Record a packet with the current system timestamp.
    pub fn record(&self, direction: Direction, packet: &[u8]) -> Result<()> {
        self.record_at(direction, SystemTime::now(), packet)
    }

    /// Record a packet with an explicit timestamp.
    pub fn record_at(
        &self,
        direction: Direction,
        timestamp: SystemTime,
        packet: &[u8],
    ) -> Result<()> {
        let record = encode_record(direction, timestamp, packet);
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("packet recorder poisoned"))?;
        file.write_all(&record)?;
        file.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for PacketRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketRecorder").finish_non_exhaustive()
    }
}

fn encode_record(direction: Direction, timestamp: SystemTime, packet: &[u8]) -> Bytes {
    let len = packet.len().min(u32::MAX as usize);
    let mut builder = PacketBuilder::with_capacity(RECORD_OVERHEAD + len);
    builder
        .write_byte(direction.as_u8())
        .write_u64(micros(timestamp))
        .write_u32(len as u32)
        .write_bytes(&packet[..len]);

    let checksum = xxh3_64(builder.as_slice());
    builder.write_u64(checksum);
    builder.finish()
}

fn micros(timestamp: SystemTime) -> u64 {
    let duration = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
    duration.as_micros().min(u128::from(u64::MAX)) as u64
}

/// One packet read back from a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPacket {
    /// Which way the packet travelled
    pub direction: Direction,
    /// When it was recorded (microsecond precision)
    pub timestamp: SystemTime,
    /// Packet contents
    pub payload: Bytes,
}

impl CapturedPacket {
    /// Open a cursor over the payload with default settings
    #[must_use]
    pub fn cursor(&self) -> PacketCursor {
        PacketCursor::new(self.payload.clone())
    }

    /// Open a cursor over the payload with the given settings
    #[must_use]
    pub fn cursor_with(&self, config: &CodecConfig) -> PacketCursor {
        config.cursor(self.payload.clone())
    }
}

/// Iterator over the records of a capture file.
///
/// Iteration stops after the first error.
#[derive(Debug)]
pub struct ReplayReader {
    cursor: PacketCursor,
    failed: bool,
}

impl ReplayReader {
    /// Read a whole capture file into memory
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Parse a capture already in memory
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let mut cursor = PacketCursor::new(data);
        let magic = cursor.read_bytes(CAPTURE_MAGIC.len())?;
        let version = cursor.read_u16()?;

        if magic.as_ref() != CAPTURE_MAGIC || version != CAPTURE_VERSION {
            return Err(invalid_data("not a packet capture"));
        }

        Ok(Self {
            cursor,
            failed: false,
        })
    }

    fn read_record(&mut self) -> Result<CapturedPacket> {
        let start = self.cursor.position()?;
        let direction = self.cursor.read_byte()?;
        let timestamp_us = self.cursor.read_u64()?;
        let len = self.cursor.read_u32()? as usize;
        let payload = self.cursor.read_bytes(len)?;
        let end = self.cursor.position()?;
        let found = self.cursor.read_u64()?;

        let expected = xxh3_64(&self.cursor.to_buffer()?[start..end]);
        if expected != found {
            return Err(Error::CorruptRecord { expected, found });
        }

        let direction = Direction::from_u8(direction)
            .ok_or_else(|| invalid_data("unknown packet direction"))?;

        Ok(CapturedPacket {
            direction,
            timestamp: UNIX_EPOCH + Duration::from_micros(timestamp_us),
            payload,
        })
    }
}

impl Iterator for ReplayReader {
    type Item = Result<CapturedPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.remaining().ok()? == 0 {
            return None;
        }

        let result = self.read_record();
        if let Err(err) = &result {
            debug!(error = %err, "stopping replay at unreadable record");
            self.failed = true;
        }
        Some(result)
    }
}

fn invalid_data(message: &'static str) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_capture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("session.wpkc");
        let recorder = PacketRecorder::create(&path).unwrap();

        let mut login = PacketBuilder::new();
        login.write_u16(0x0001).write_prefixed_string("player");
        recorder
            .record_at(
                Direction::Inbound,
                UNIX_EPOCH + Duration::from_micros(1_500),
                login.as_slice(),
            )
            .unwrap();
        recorder.record(Direction::Outbound, &[0x00, 0x00]).unwrap();
        path
    }

    #[test]
    fn test_record_and_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_capture(dir.path());

        let packets: Vec<_> = ReplayReader::open(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].direction, Direction::Inbound);
        assert_eq!(packets[0].timestamp, UNIX_EPOCH + Duration::from_micros(1_500));
        assert_eq!(packets[1].direction, Direction::Outbound);

        let mut cursor = packets[0].cursor();
        assert_eq!(cursor.read_u16().unwrap(), 1);
        assert_eq!(cursor.read_prefixed_string().unwrap(), "player");
    }

    #[test]
    fn test_corrupt_record_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_capture(dir.path());
        let mut data = std::fs::read(&path).unwrap();

        // Flip a payload byte of the first record
        let header_len = CAPTURE_MAGIC.len() + 2;
        data[header_len + 1 + 8 + 4] ^= 0xFF;

        let mut reader = ReplayReader::from_bytes(data).unwrap();
        assert!(matches!(reader.next(), Some(Err(Error::CorruptRecord { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_capture(dir.path());
        let mut data = std::fs::read(&path).unwrap();
        data.truncate(data.len() - 3);

        let results: Vec<_> = ReplayReader::from_bytes(data).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_rejects_foreign_file() {
        let result = ReplayReader::from_bytes(&b"PCAP\x01\x00"[..]);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
