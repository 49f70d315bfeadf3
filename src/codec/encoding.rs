//! String codepages shared by the cursor and the builder
//!
//! Legacy clients send text one byte per character in a fixed 8-bit codepage.
//! Which codepage is a property of the client build, so it is pluggable via the
//! [`Codepage`] trait rather than baked into the codec.

use std::fmt;
use std::sync::Arc;

use bytes::BufMut;

use super::{Error, Result};

/// Byte written in place of a character the codepage cannot represent.
pub const UNMAPPABLE_BYTE: u8 = b'?';

/// A single-byte character set.
pub trait Codepage: fmt::Debug + Send + Sync {
    /// Human-readable codepage name, used in error messages
    fn name(&self) -> &'static str;

    /// Map one byte to a character, `None` if the byte is undefined
    fn decode_byte(&self, byte: u8) -> Option<char>;

    /// Map one character to a byte, `None` if it has no representation
    fn encode_char(&self, ch: char) -> Option<u8>;
}

/// ISO-8859-1: every byte maps to the code point of the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl Codepage for Latin1 {
    fn name(&self) -> &'static str {
        "ISO-8859-1"
    }

    fn decode_byte(&self, byte: u8) -> Option<char> {
        Some(char::from(byte))
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        u8::try_from(u32::from(ch)).ok()
    }
}

/// 7-bit US-ASCII. Bytes above 0x7F are undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

impl Codepage for Ascii {
    fn name(&self) -> &'static str {
        "US-ASCII"
    }

    fn decode_byte(&self, byte: u8) -> Option<char> {
        byte.is_ascii().then(|| char::from(byte))
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        if ch.is_ascii() { Some(ch as u8) } else { None }
    }
}

/// Windows-1252 (Western European).
///
/// Matches Latin-1 outside 0x80..=0x9F; that block carries typographic
/// characters and five undefined bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows1252;

const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl Codepage for Windows1252 {
    fn name(&self) -> &'static str {
        "windows-1252"
    }

    fn decode_byte(&self, byte: u8) -> Option<char> {
        match byte {
            0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
            _ => Some(char::from(byte)),
        }
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        match u32::from(ch) {
            code @ (0x00..=0x7F | 0xA0..=0xFF) => Some(code as u8),
            _ => WINDOWS_1252_HIGH
                .iter()
                .position(|mapped| *mapped == Some(ch))
                .map(|index| 0x80 + index as u8),
        }
    }
}

/// Built-in codepages, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodepageKind {
    /// ISO-8859-1
    Latin1,
    /// Windows-1252
    #[default]
    Windows1252,
    /// 7-bit US-ASCII
    Ascii,
}

impl CodepageKind {
    /// Instantiate the codepage
    #[must_use]
    pub fn codepage(self) -> Arc<dyn Codepage> {
        match self {
            Self::Latin1 => Arc::new(Latin1),
            Self::Windows1252 => Arc::new(Windows1252),
            Self::Ascii => Arc::new(Ascii),
        }
    }
}

/// What to do with a byte the codepage does not define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodePolicy {
    /// Substitute U+FFFD and keep going
    #[default]
    Replace,
    /// Fail with [`Error::MalformedEncoding`]
    Strict,
}

/// Codepage plus decode policy; cheap to clone.
#[derive(Debug, Clone)]
pub struct TextEncoding {
    codepage: Arc<dyn Codepage>,
    policy: DecodePolicy,
}

impl TextEncoding {
    /// Create an encoding from any codepage
    #[must_use]
    pub fn new(codepage: Arc<dyn Codepage>, policy: DecodePolicy) -> Self {
        Self { codepage, policy }
    }

    /// Create an encoding from a built-in codepage
    #[must_use]
    pub fn builtin(kind: CodepageKind, policy: DecodePolicy) -> Self {
        Self::new(kind.codepage(), policy)
    }

    /// Get the codepage
    #[must_use]
    pub fn codepage(&self) -> &dyn Codepage {
        self.codepage.as_ref()
    }

    /// Get the decode policy
    #[must_use]
    pub const fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Decode raw bytes.
    ///
    /// `offset` is the absolute packet offset of `bytes[0]` and is only used
    /// to locate a malformed byte in the returned error.
    pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<String> {
        let mut text = String::with_capacity(bytes.len());
        for (index, &byte) in bytes.iter().enumerate() {
            match (self.codepage.decode_byte(byte), self.policy) {
                (Some(ch), _) => text.push(ch),
                (None, DecodePolicy::Replace) => text.push(char::REPLACEMENT_CHARACTER),
                (None, DecodePolicy::Strict) => {
                    return Err(Error::MalformedEncoding {
                        byte,
                        offset: offset + index,
                        codepage: self.codepage.name(),
                    });
                }
            }
        }
        Ok(text)
    }

    /// Number of bytes `text` occupies once encoded
    #[must_use]
    pub fn encoded_len(&self, text: &str) -> usize {
        text.chars().count()
    }

    /// Encode at most `limit` characters of `text` into `dst`.
    ///
    /// Unmappable characters become [`UNMAPPABLE_BYTE`]. Returns the number of
    /// bytes written.
    pub fn encode_into(&self, text: &str, limit: usize, dst: &mut impl BufMut) -> usize {
        let mut written = 0;
        for ch in text.chars().take(limit) {
            dst.put_u8(self.codepage.encode_char(ch).unwrap_or(UNMAPPABLE_BYTE));
            written += 1;
        }
        written
    }

    /// Encode all of `text` into a new vector
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len(text));
        self.encode_into(text, usize::MAX, &mut out);
        out
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::builtin(CodepageKind::default(), DecodePolicy::default())
    }
}
