use std::collections::HashMap;

use bytes::Bytes;
use wirepack::{CodecConfig, CodepageKind, DecodePolicy, Error, PacketCursor, Result};

const LOGIN: u16 = 0x0001;
const CHAT: u16 = 0x0031;
const LOGIN_RESULT: u16 = 0x0000;
const CHAT_ECHO: u16 = 0x00A2;

type Handler = fn(&CodecConfig, &mut PacketCursor) -> Result<Bytes>;

/// Minimal opcode router standing in for a real server's dispatcher.
struct Dispatcher {
    config: CodecConfig,
    handlers: HashMap<u16, Handler>,
    dropped: usize,
}

impl Dispatcher {
    fn new(config: CodecConfig) -> Self {
        let mut handlers: HashMap<u16, Handler> = HashMap::new();
        handlers.insert(LOGIN, handle_login);
        handlers.insert(CHAT, handle_chat);
        Self {
            config,
            handlers,
            dropped: 0,
        }
    }

    /// Route one framed packet; a decode failure drops it.
    fn dispatch(&mut self, packet: Bytes) -> Option<Bytes> {
        let mut cursor = self.config.cursor(packet);
        let reply = cursor
            .read_u16()
            .and_then(|opcode| match self.handlers.get(&opcode) {
                Some(handler) => handler(&self.config, &mut cursor).map(Some),
                None => Ok(None),
            });

        match reply {
            Ok(reply) => reply,
            Err(_) => {
                self.dropped += 1;
                None
            }
        }
    }
}

fn handle_login(config: &CodecConfig, cursor: &mut PacketCursor) -> Result<Bytes> {
    let name = cursor.read_prefixed_string()?;
    let password = cursor.read_prefixed_string()?;
    cursor.skip(6)?; // hardware id
    let remember = cursor.read_bool()?;

    let mut reply = config.builder();
    reply
        .write_u16(LOGIN_RESULT)
        .write_byte(u8::from(password != "hunter2"))
        .write_fixed_string(&name, 13)
        .write_bool(remember)
        .write_i64(1_234_567_890_123);
    Ok(reply.finish())
}

fn handle_chat(config: &CodecConfig, cursor: &mut PacketCursor) -> Result<Bytes> {
    let character_id = cursor.read_i32()?;
    let text = cursor.read_prefixed_string()?;
    let shout = cursor.read_bool()?;

    let mut reply = config.builder();
    reply
        .write_u16(CHAT_ECHO)
        .write_i32(character_id)
        .write_bool(shout)
        .write_prefixed_string(&text);
    Ok(reply.finish())
}

fn login_packet(config: &CodecConfig, name: &str, password: &str) -> Bytes {
    let mut packet = config.builder();
    packet
        .write_u16(LOGIN)
        .write_prefixed_string(name)
        .write_prefixed_string(password)
        .write_bytes(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01])
        .write_bool(true);
    packet.finish()
}

#[test]
fn login_roundtrip_through_dispatcher() {
    let config = CodecConfig::default();
    let mut dispatcher = Dispatcher::new(config.clone());

    let reply = dispatcher
        .dispatch(login_packet(&config, "Cr\u{E8}me", "hunter2"))
        .expect("login reply");

    let mut cursor = config.cursor(reply);
    assert_eq!(cursor.read_u16().unwrap(), LOGIN_RESULT);
    assert_eq!(cursor.read_byte().unwrap(), 0);
    assert_eq!(cursor.read_padded_string(13).unwrap(), "Cr\u{E8}me");
    assert!(cursor.read_bool().unwrap());
    assert_eq!(cursor.read_i64().unwrap(), 1_234_567_890_123);
    assert_eq!(cursor.remaining().unwrap(), 0);
    assert_eq!(dispatcher.dropped, 0);
}

#[test]
fn chat_echo_preserves_codepage_text() {
    let config = CodecConfig::default();
    let mut dispatcher = Dispatcher::new(config.clone());

    let mut packet = config.builder();
    packet
        .write_u16(CHAT)
        .write_i32(-7)
        .write_prefixed_string("10\u{20AC} \u{2013} ok")
        .write_bool(false);

    let reply = dispatcher.dispatch(packet.finish()).expect("chat reply");
    let mut cursor = PacketCursor::new(reply);
    assert_eq!(cursor.read_u16().unwrap(), CHAT_ECHO);
    assert_eq!(cursor.read_i32().unwrap(), -7);
    assert!(!cursor.read_bool().unwrap());
    assert_eq!(cursor.read_prefixed_string().unwrap(), "10\u{20AC} \u{2013} ok");
}

#[test]
fn truncated_packet_is_dropped() {
    let config = CodecConfig::default();
    let mut dispatcher = Dispatcher::new(config.clone());

    let full = login_packet(&config, "player", "secret");
    let truncated = full.slice(..full.len() - 1);

    assert!(dispatcher.dispatch(truncated).is_none());
    assert_eq!(dispatcher.dropped, 1);
}

#[test]
fn negative_string_length_is_dropped() {
    let config = CodecConfig::default();
    let mut dispatcher = Dispatcher::new(config.clone());

    let mut packet = config.builder();
    packet.write_u16(LOGIN).write_i16(-1).write_bytes(b"player");

    assert!(dispatcher.dispatch(packet.finish()).is_none());
    assert_eq!(dispatcher.dropped, 1);
}

#[test]
fn unknown_opcode_is_ignored() {
    let config = CodecConfig::default();
    let mut dispatcher = Dispatcher::new(config.clone());

    assert!(dispatcher.dispatch(Bytes::from_static(&[0xFF, 0x7F])).is_none());
    assert!(dispatcher.dispatch(Bytes::from_static(&[0x01])).is_none());
    assert_eq!(dispatcher.dropped, 1);
}

#[test]
fn strict_config_rejects_undefined_bytes() {
    let config = CodecConfig {
        codepage: CodepageKind::Windows1252,
        decode_policy: DecodePolicy::Strict,
        ..CodecConfig::default()
    };

    let mut cursor = config.cursor(Bytes::from_static(&[0x03, 0x00, b'a', 0x9D, b'b']));
    let err = cursor.read_prefixed_string().unwrap_err();
    assert!(matches!(err, Error::MalformedEncoding { byte: 0x9D, offset: 3, .. }));
    assert!(err.to_string().contains("windows-1252"));
    assert_eq!(cursor.position().unwrap(), 0);

    let lenient = CodecConfig::default();
    let mut cursor = lenient.cursor(Bytes::from_static(&[0x03, 0x00, b'a', 0x9D, b'b']));
    assert_eq!(cursor.read_prefixed_string().unwrap(), "a\u{FFFD}b");
}

#[test]
fn cursor_usable_after_failure_until_released() {
    let packet = Bytes::from_static(&[0x01, 0x00, 0x02]);

    let read_past_end = |cursor: &mut PacketCursor| -> Result<i32> {
        let _opcode = cursor.read_u16()?;
        cursor.read_i32()
    };

    let mut cursor = PacketCursor::new(packet.clone());
    assert!(read_past_end(&mut cursor).is_err());
    assert_eq!(cursor.to_buffer().unwrap(), packet);
    cursor.release();
    cursor.release();
    assert!(matches!(cursor.read_byte(), Err(Error::Released)));
}
