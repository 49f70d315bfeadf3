//! Codec configuration.

use bytes::Bytes;

use crate::codec::{
    CodepageKind, DEFAULT_BUILDER_CAPACITY, DecodePolicy, PacketBuilder, PacketCursor,
    TextEncoding,
};

/// Codec configuration options.
///
/// The codepage is a property of the client build being served, so it lives
/// here rather than in the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    /// Codepage used for every string field.
    pub codepage: CodepageKind,
    /// Handling of bytes the codepage does not define.
    pub decode_policy: DecodePolicy,
    /// Initial capacity of builders created from this config.
    pub builder_capacity: usize,
    /// Longest length-prefixed string a cursor will accept.
    pub max_string_len: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            codepage: CodepageKind::default(),
            decode_policy: DecodePolicy::default(),
            builder_capacity: DEFAULT_BUILDER_CAPACITY,
            max_string_len: None,
        }
    }
}

impl CodecConfig {
    /// Text encoding described by this config
    #[must_use]
    pub fn text_encoding(&self) -> TextEncoding {
        TextEncoding::builtin(self.codepage, self.decode_policy)
    }

    /// Open a cursor over a received packet
    pub fn cursor(&self, packet: impl Into<Bytes>) -> PacketCursor {
        PacketCursor::with_encoding(packet, self.text_encoding())
            .with_max_string_len(self.max_string_len)
    }

    /// Start an outgoing packet
    #[must_use]
    pub fn builder(&self) -> PacketBuilder {
        PacketBuilder::with_encoding(self.text_encoding(), self.builder_capacity)
    }
}
