//! The binary command envelope carried in WebSocket binary frames, and the
//! coded parameters of cross-runtime function calls.
//!
//! Multi-byte numeric fields travel in the **peer's** native byte order: the
//! sending side swaps when its endianness differs from the peer's, the
//! receiving side swaps inbound fields under the same condition. Which case
//! applies is settled once, by the Handshake/Ack exchange.

use crate::error::Error;
use bytes::{BufMut, Bytes, BytesMut};

/// Command discriminants of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Handshake = 0,
    Ack = 1,
    TextCommand = 2,
    FunctionCall = 3,
    FunctionReturn = 4,
}

/// Byte-order advertisement exchanged in Handshake/Ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JsEndian {
    Little = 0,
    Big = 1,
}

impl JsEndian {
    /// The byte order of this host.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            JsEndian::Little
        } else {
            JsEndian::Big
        }
    }
}

/// Opcodes of [`Command::TextCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxtOpcode {
    DebugLog = 0,
    InjectScript = 1,
}

/// Type tags of the self-delimiting coded parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodedType {
    Undefined = 0,
    BooleanTrue = 1,
    BooleanFalse = 2,
    Number = 3,
    SmallString = 4,
    String = 5,
}

/// A decoded inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum WebLinkMessage {
    Handshake { endian: JsEndian },
    Ack { endian: JsEndian },
    Text { opcode: TxtOpcode, text: String },
    FunctionCall { param_count: u8, params: Bytes },
    FunctionReturn { param_count: u8, params: Bytes },
}

impl WebLinkMessage {
    /// Parses one command from the payload of a binary frame. `same_endian`
    /// tells whether the peer shares the host byte order.
    pub fn parse(data: &[u8], same_endian: bool) -> Result<Self, Error> {
        let command = *data.first().ok_or(Error::ShortHeader)?;
        match command {
            c if c == Command::Handshake as u8 => {
                Ok(WebLinkMessage::Handshake { endian: parse_endian(data)? })
            }
            c if c == Command::Ack as u8 => Ok(WebLinkMessage::Ack { endian: parse_endian(data)? }),
            c if c == Command::TextCommand as u8 => {
                if data.len() < 4 {
                    return Err(Error::ShortHeader);
                }
                let opcode = match data[1] {
                    0 => TxtOpcode::DebugLog,
                    1 => TxtOpcode::InjectScript,
                    other => return Err(Error::UnknownCommand(other)),
                };
                let length = 256 * usize::from(data[2]) + usize::from(data[3]);
                let payload = data.get(4..4 + length).ok_or(Error::ShortPayload)?;
                Ok(WebLinkMessage::Text {
                    opcode,
                    text: String::from_utf8_lossy(payload).into_owned(),
                })
            }
            c if c == Command::FunctionCall as u8 || c == Command::FunctionReturn as u8 => {
                if data.len() < 8 {
                    return Err(Error::ShortHeader);
                }
                let param_count = data[1];
                // data[2..4] is padding
                let size =
                    read_u32([data[4], data[5], data[6], data[7]], same_endian) as usize;
                let params = data.get(8..8 + size).ok_or(Error::ShortPayload)?;
                let params = Bytes::copy_from_slice(params);
                if c == Command::FunctionCall as u8 {
                    Ok(WebLinkMessage::FunctionCall { param_count, params })
                } else {
                    Ok(WebLinkMessage::FunctionReturn { param_count, params })
                }
            }
            other => Err(Error::UnknownCommand(other)),
        }
    }
}

fn parse_endian(data: &[u8]) -> Result<JsEndian, Error> {
    match *data.get(1).ok_or(Error::ShortHeader)? {
        0 => Ok(JsEndian::Little),
        _ => Ok(JsEndian::Big),
    }
}

/// Serializes the Ack reply carrying the host's byte order.
pub fn encode_ack() -> Bytes {
    Bytes::copy_from_slice(&[Command::Ack as u8, JsEndian::native() as u8])
}

/// Serializes a TextCommand header and its UTF-8 payload as two spans.
pub fn encode_text_command(opcode: TxtOpcode, text: &str) -> Result<(Bytes, Bytes), Error> {
    if text.len() > usize::from(u16::MAX) {
        return Err(Error::InvalidArgument("text command payload exceeds 65535 bytes"));
    }
    let header =
        [Command::TextCommand as u8, opcode as u8, (text.len() >> 8) as u8, text.len() as u8];
    Ok((Bytes::copy_from_slice(&header), Bytes::copy_from_slice(text.as_bytes())))
}

/// Serializes a FunctionCall header for an already-encoded parameter block.
pub fn encode_function_call(param_count: u8, params: Bytes, same_endian: bool) -> (Bytes, Bytes) {
    let mut header = BytesMut::with_capacity(8);
    header.put_u8(Command::FunctionCall as u8);
    header.put_u8(param_count);
    header.put_slice(&[0, 0]);
    header.put_slice(&write_u32(params.len() as u32, same_endian));
    (header.freeze(), params)
}

fn read_u32(bytes: [u8; 4], same_endian: bool) -> u32 {
    let value = u32::from_ne_bytes(bytes);
    if same_endian {
        value
    } else {
        value.swap_bytes()
    }
}

fn write_u32(value: u32, same_endian: bool) -> [u8; 4] {
    if same_endian {
        value.to_ne_bytes()
    } else {
        value.swap_bytes().to_ne_bytes()
    }
}

fn read_u16(bytes: [u8; 2], same_endian: bool) -> u16 {
    let value = u16::from_ne_bytes(bytes);
    if same_endian {
        value
    } else {
        value.swap_bytes()
    }
}

fn write_u16(value: u16, same_endian: bool) -> [u8; 2] {
    if same_endian {
        value.to_ne_bytes()
    } else {
        value.swap_bytes().to_ne_bytes()
    }
}

/// One decoded parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Undefined,
    Boolean(bool),
    Number(f64),
    Text(String),
}

/// Iterative decoder over a coded-parameter block.
#[derive(Debug, Clone)]
pub struct ParamReader {
    data: Bytes,
    offset: usize,
    same_endian: bool,
}

impl ParamReader {
    pub fn new(data: Bytes, same_endian: bool) -> Self {
        Self { data, offset: 0, same_endian }
    }

    /// Bytes not yet decoded.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decodes the next parameter.
    pub fn next_value(&mut self) -> Result<ParamValue, Error> {
        let tag = *self.data.get(self.offset).ok_or(Error::ShortPayload)?;
        self.offset += 1;
        match tag {
            t if t == CodedType::Undefined as u8 => Ok(ParamValue::Undefined),
            t if t == CodedType::BooleanTrue as u8 => Ok(ParamValue::Boolean(true)),
            t if t == CodedType::BooleanFalse as u8 => Ok(ParamValue::Boolean(false)),
            t if t == CodedType::Number as u8 => {
                let bytes = self.take(8)?;
                let mut raw = u64::from_ne_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ]);
                if !self.same_endian {
                    raw = raw.swap_bytes();
                }
                Ok(ParamValue::Number(f64::from_bits(raw)))
            }
            t if t == CodedType::SmallString as u8 => {
                let length = usize::from(self.take(1)?[0]);
                let bytes = self.take(length)?;
                Ok(ParamValue::Text(String::from_utf8_lossy(bytes).into_owned()))
            }
            t if t == CodedType::String as u8 => {
                let length_bytes = self.take(2)?;
                let length =
                    usize::from(read_u16([length_bytes[0], length_bytes[1]], self.same_endian));
                let bytes = self.take(length)?;
                Ok(ParamValue::Text(String::from_utf8_lossy(bytes).into_owned()))
            }
            other => Err(Error::UnknownParameterTag(other)),
        }
    }

    fn take(&mut self, count: usize) -> Result<&[u8], Error> {
        let end = self.offset.checked_add(count).ok_or(Error::LengthOverflow)?;
        let slice = self.data.get(self.offset..end).ok_or(Error::LengthOverflow)?;
        self.offset = end;
        Ok(slice)
    }
}

/// Appends coded parameters to an outbound block.
#[derive(Debug)]
pub struct ParamWriter {
    buffer: BytesMut,
    count: u8,
    same_endian: bool,
}

impl ParamWriter {
    pub fn new(same_endian: bool) -> Self {
        Self { buffer: BytesMut::new(), count: 0, same_endian }
    }

    pub fn push_undefined(&mut self) {
        self.buffer.put_u8(CodedType::Undefined as u8);
        self.count += 1;
    }

    pub fn push_bool(&mut self, value: bool) {
        self.buffer.put_u8(if value {
            CodedType::BooleanTrue as u8
        } else {
            CodedType::BooleanFalse as u8
        });
        self.count += 1;
    }

    pub fn push_number(&mut self, value: f64) {
        self.buffer.put_u8(CodedType::Number as u8);
        let mut raw = value.to_bits();
        if !self.same_endian {
            raw = raw.swap_bytes();
        }
        self.buffer.put_slice(&raw.to_ne_bytes());
        self.count += 1;
    }

    /// Encodes as smallString below 256 bytes, string up to 65535 bytes.
    pub fn push_str(&mut self, value: &str) -> Result<(), Error> {
        if value.len() < 256 {
            self.buffer.put_u8(CodedType::SmallString as u8);
            self.buffer.put_u8(value.len() as u8);
        } else if value.len() <= usize::from(u16::MAX) {
            self.buffer.put_u8(CodedType::String as u8);
            self.buffer.put_slice(&write_u16(value.len() as u16, self.same_endian));
        } else {
            return Err(Error::InvalidArgument("string parameter exceeds 65535 bytes"));
        }
        self.buffer.put_slice(value.as_bytes());
        self.count += 1;
        Ok(())
    }

    /// The number of parameters pushed so far and the encoded block.
    pub fn finish(self) -> (u8, Bytes) {
        (self.count, self.buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_same_endian() -> bool {
        // test vectors below are captured from a little-endian client
        cfg!(target_endian = "little")
    }

    #[test]
    fn the_handshake_and_ack_carry_the_endianness() {
        let message = WebLinkMessage::parse(&[0, 0], true).unwrap();
        assert_eq!(message, WebLinkMessage::Handshake { endian: JsEndian::Little });
        let message = WebLinkMessage::parse(&[1, 1], true).unwrap();
        assert_eq!(message, WebLinkMessage::Ack { endian: JsEndian::Big });
        assert!(matches!(WebLinkMessage::parse(&[0], true), Err(Error::ShortHeader)));
    }

    #[test]
    fn a_captured_function_call_decodes_parameter_by_parameter() {
        // FunctionCall: 2 parameters, 28 payload bytes (size field in the
        // little-endian client's order), smallString "print" then
        // smallString "Hello World of 2022"
        let mut data = vec![0x03, 0x02, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00];
        data.extend_from_slice(&[0x04, 0x05]);
        data.extend_from_slice(b"print");
        data.extend_from_slice(&[0x04, 0x13]);
        data.extend_from_slice(b"Hello World of 2022");

        let same_endian = host_same_endian();
        let message = WebLinkMessage::parse(&data, same_endian).unwrap();
        let WebLinkMessage::FunctionCall { param_count, params } = message else {
            panic!("expected a function call");
        };
        assert_eq!(param_count, 2);

        let mut reader = ParamReader::new(params, same_endian);
        assert_eq!(reader.next_value().unwrap(), ParamValue::Text("print".into()));
        assert_eq!(
            reader.next_value().unwrap(),
            ParamValue::Text("Hello World of 2022".into())
        );
        assert!(reader.is_empty());
    }

    #[test]
    fn short_envelopes_are_rejected() {
        assert!(matches!(WebLinkMessage::parse(&[], true), Err(Error::ShortHeader)));
        assert!(matches!(
            WebLinkMessage::parse(&[0x03, 0x01, 0, 0], true),
            Err(Error::ShortHeader)
        ));
        // declared 4 payload bytes, got 2
        let data = [0x03, 0x01, 0, 0, 4, 0, 0, 0, 0xAA, 0xBB];
        assert!(matches!(
            WebLinkMessage::parse(&data, host_same_endian()),
            Err(Error::ShortPayload)
        ));
    }

    #[test]
    fn unknown_commands_and_tags_are_rejected() {
        assert!(matches!(WebLinkMessage::parse(&[9, 0], true), Err(Error::UnknownCommand(9))));

        let mut reader = ParamReader::new(Bytes::from_static(&[0x77]), true);
        assert!(matches!(reader.next_value(), Err(Error::UnknownParameterTag(0x77))));
    }

    #[test]
    fn a_truncated_small_string_is_a_length_overflow() {
        let mut reader = ParamReader::new(Bytes::from_static(&[0x04, 0x05, b'p', b'r']), true);
        assert!(matches!(reader.next_value(), Err(Error::LengthOverflow)));
    }

    #[test]
    fn text_commands_use_the_hi_lo_length_split() {
        let text = "x".repeat(300);
        let (header, payload) = encode_text_command(TxtOpcode::InjectScript, &text).unwrap();
        assert_eq!(&header[..], &[2, 1, 1, 44]); // 256 + 44
        assert_eq!(payload.len(), 300);

        let mut wire = header.to_vec();
        wire.extend_from_slice(&payload);
        let message = WebLinkMessage::parse(&wire, true).unwrap();
        assert_eq!(message, WebLinkMessage::Text { opcode: TxtOpcode::InjectScript, text });
    }

    #[test]
    fn parameters_round_trip_in_both_endian_configurations() {
        for same_endian in [true, false] {
            let mut writer = ParamWriter::new(same_endian);
            writer.push_bool(true);
            writer.push_bool(false);
            writer.push_number(2022.0);
            writer.push_str("maFunction").unwrap();
            writer.push_str(&"élan ".repeat(100)).unwrap();
            writer.push_undefined();
            let (count, block) = writer.finish();
            assert_eq!(count, 6);

            let mut reader = ParamReader::new(block, same_endian);
            assert_eq!(reader.next_value().unwrap(), ParamValue::Boolean(true));
            assert_eq!(reader.next_value().unwrap(), ParamValue::Boolean(false));
            assert_eq!(reader.next_value().unwrap(), ParamValue::Number(2022.0));
            assert_eq!(reader.next_value().unwrap(), ParamValue::Text("maFunction".into()));
            assert_eq!(
                reader.next_value().unwrap(),
                ParamValue::Text("élan ".repeat(100))
            );
            assert_eq!(reader.next_value().unwrap(), ParamValue::Undefined);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn string_selection_follows_the_255_byte_boundary() {
        let mut writer = ParamWriter::new(true);
        writer.push_str(&"a".repeat(255)).unwrap();
        writer.push_str(&"b".repeat(256)).unwrap();
        let (_, block) = writer.finish();
        assert_eq!(block[0], CodedType::SmallString as u8);
        assert_eq!(block[1], 255);
        assert_eq!(block[2 + 255], CodedType::String as u8);

        let mut writer = ParamWriter::new(true);
        assert!(writer.push_str(&"c".repeat(70_000)).is_err());
    }

    #[test]
    fn function_call_headers_mirror_the_parse_side() {
        let mut writer = ParamWriter::new(true);
        writer.push_str("print").unwrap();
        writer.push_str("Hello World of 2022").unwrap();
        let (count, block) = writer.finish();
        let (header, payload) = encode_function_call(count, block, true);

        let mut wire = header.to_vec();
        wire.extend_from_slice(&payload);
        let message = WebLinkMessage::parse(&wire, true).unwrap();
        let WebLinkMessage::FunctionCall { param_count, params } = message else {
            panic!("expected a function call");
        };
        assert_eq!(param_count, 2);
        assert_eq!(params.len(), 28);
    }

    #[test]
    fn cross_endian_sizes_are_byte_swapped_on_both_sides() {
        let params = Bytes::from_static(&[CodedType::BooleanTrue as u8]);
        let (header, _) = encode_function_call(1, params.clone(), false);
        // the peer reads this field natively, so on the wire it is swapped
        // relative to our order
        let expected = 1u32.swap_bytes().to_ne_bytes();
        assert_eq!(&header[4..8], &expected);

        let mut wire = header.to_vec();
        wire.extend_from_slice(&params);
        let message = WebLinkMessage::parse(&wire, false).unwrap();
        assert!(matches!(message, WebLinkMessage::FunctionCall { param_count: 1, .. }));
    }
}
