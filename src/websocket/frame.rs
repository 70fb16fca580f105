//! RFC 6455 frame headers and outbound frame construction.

use bytes::Bytes;

/// Largest possible header: 2 fixed bytes, 8 extended-length bytes, 4 mask
/// bytes.
pub(crate) const MAX_HEADER_SIZE: usize = 14;

/// Data and control opcodes. Reserved values decode to `None` in
/// [`FrameHeader::opcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    ConnectionClose = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl Opcode {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x0 => Some(Opcode::Continuation),
            0x1 => Some(Opcode::Text),
            0x2 => Some(Opcode::Binary),
            0x8 => Some(Opcode::ConnectionClose),
            0x9 => Some(Opcode::Ping),
            0xA => Some(Opcode::Pong),
            _ => None,
        }
    }
}

/// A frame header over the fixed 14-byte scratch.
///
/// Accessors are meaningful once [`is_complete`](Self::is_complete) holds for
/// the number of bytes written so far; `payload_size` answers identically
/// whether the 7-bit field is direct (0–125) or selects the 16- or 64-bit
/// extension.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    raw: [u8; MAX_HEADER_SIZE],
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHeader {
    pub fn new() -> Self {
        Self { raw: [0; MAX_HEADER_SIZE] }
    }

    /// A header view over the first bytes of `bytes` (shorter prefixes are
    /// zero-padded; check `is_complete` before trusting the accessors).
    pub(crate) fn from_prefix(bytes: &[u8]) -> Self {
        let mut header = Self::new();
        let count = bytes.len().min(MAX_HEADER_SIZE);
        header.raw[..count].copy_from_slice(&bytes[..count]);
        header
    }

    pub fn fin(&self) -> bool {
        self.raw[0] & 0x80 != 0
    }

    pub fn rsv1(&self) -> bool {
        self.raw[0] & 0x40 != 0
    }

    pub fn rsv2(&self) -> bool {
        self.raw[0] & 0x20 != 0
    }

    pub fn rsv3(&self) -> bool {
        self.raw[0] & 0x10 != 0
    }

    pub fn opcode_bits(&self) -> u8 {
        self.raw[0] & 0x0f
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_bits(self.opcode_bits())
    }

    pub fn masked(&self) -> bool {
        self.raw[1] & 0x80 != 0
    }

    /// The raw 7-bit length field: a direct length below 126, otherwise the
    /// selector of the extended field.
    pub fn payload_len_field(&self) -> u8 {
        self.raw[1] & 0x7f
    }

    pub fn payload_size(&self) -> u64 {
        match self.payload_len_field() {
            len @ 0..=125 => u64::from(len),
            126 => u64::from(u16::from_be_bytes([self.raw[2], self.raw[3]])),
            _ => u64::from_be_bytes([
                self.raw[2],
                self.raw[3],
                self.raw[4],
                self.raw[5],
                self.raw[6],
                self.raw[7],
                self.raw[8],
                self.raw[9],
            ]),
        }
    }

    pub fn header_size(&self) -> usize {
        let base = match self.payload_len_field() {
            0..=125 => 2,
            126 => 4,
            _ => 10,
        };
        base + if self.masked() { 4 } else { 0 }
    }

    pub fn masking_key(&self) -> Option<[u8; 4]> {
        if !self.masked() {
            return None;
        }
        let index = self.header_size() - 4;
        Some([self.raw[index], self.raw[index + 1], self.raw[index + 2], self.raw[index + 3]])
    }

    /// `true` when the first `len` bytes already contain the whole header.
    pub fn is_complete(&self, len: usize) -> bool {
        len >= 2 && len >= self.header_size()
    }

    pub fn set_fin(&mut self, fin: bool) {
        if fin {
            self.raw[0] |= 0x80;
        } else {
            self.raw[0] &= 0x7f;
        }
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.raw[0] = (self.raw[0] & 0xf0) | opcode as u8;
    }

    /// Picks the minimal length encoding. Leaves the MASK bit clear:
    /// server-to-client frames are unmasked.
    pub fn set_payload_size(&mut self, size: u64) {
        self.raw[1] &= 0x80;
        if size < 126 {
            self.raw[1] |= size as u8;
        } else if size < 65536 {
            self.raw[1] |= 126;
            self.raw[2..4].copy_from_slice(&(size as u16).to_be_bytes());
        } else {
            self.raw[1] |= 127;
            self.raw[2..10].copy_from_slice(&size.to_be_bytes());
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.raw[..self.header_size()]
    }
}

/// An outbound single-frame message: FIN set, unmasked, payload assembled
/// from up to two spans so a command header and its payload need no
/// concatenation copy.
#[derive(Debug, Clone)]
pub struct Frame {
    pub(crate) header: FrameHeader,
    pub(crate) head: Bytes,
    pub(crate) tail: Bytes,
}

impl Frame {
    pub fn text(text: &str) -> Self {
        Self::build(Opcode::Text, Bytes::copy_from_slice(text.as_bytes()), Bytes::new())
    }

    pub fn binary(head: Bytes, tail: Bytes) -> Self {
        Self::build(Opcode::Binary, head, tail)
    }

    fn build(opcode: Opcode, head: Bytes, tail: Bytes) -> Self {
        let mut header = FrameHeader::new();
        header.set_fin(true);
        header.set_opcode(opcode);
        header.set_payload_size((head.len() + tail.len()) as u64);
        Self { header, head, tail }
    }

    pub fn payload_size(&self) -> u64 {
        self.header.payload_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::decoder::{ChunkStatus, FrameDecoder};

    fn wire_bytes(frame: &Frame) -> Vec<u8> {
        let mut wire = frame.header.bytes().to_vec();
        wire.extend_from_slice(&frame.head);
        wire.extend_from_slice(&frame.tail);
        wire
    }

    #[test]
    fn outbound_frames_pick_the_minimal_length_encoding() {
        for (size, expected_header) in [(0, 2), (125, 2), (126, 4), (65535, 4), (65536, 10)] {
            let frame = Frame::binary(Bytes::from(vec![0u8; size]), Bytes::new());
            assert_eq!(frame.header.header_size(), expected_header, "payload of {size}");
            assert_eq!(frame.payload_size(), size as u64);
            assert!(frame.header.fin());
            assert!(!frame.header.masked());
        }
    }

    #[test]
    fn encode_decode_round_trip_across_length_encodings() {
        for size in [0usize, 125, 126, 65535, 65536] {
            let payload: Vec<u8> = (0..size).map(|i| i as u8).collect();
            let frame = Frame::binary(Bytes::from(payload.clone()), Bytes::new());

            let mut decoder = FrameDecoder::new();
            let wire = wire_bytes(&frame);
            match decoder.feed(&wire) {
                ChunkStatus::Complete { consumed } => assert_eq!(consumed, wire.len()),
                ChunkStatus::NeedMore => panic!("frame of {size} did not complete"),
            }
            assert_eq!(decoder.opcode(), Some(Opcode::Binary));
            assert_eq!(decoder.payload(), &payload[..]);
        }
    }

    #[test]
    fn header_completion_accounts_for_the_mask_and_extensions() {
        // unmasked, short length: two bytes suffice
        let header = FrameHeader::from_prefix(&[0x82, 0x05]);
        assert!(!header.is_complete(1));
        assert!(header.is_complete(2));

        // masked, 16-bit length: 2 + 2 + 4
        let header = FrameHeader::from_prefix(&[0x82, 0xfe, 0x01, 0x00, 1, 2, 3, 4]);
        assert!(!header.is_complete(7));
        assert!(header.is_complete(8));
        assert_eq!(header.payload_size(), 256);
        assert_eq!(header.masking_key(), Some([1, 2, 3, 4]));

        // masked, 64-bit length: 2 + 8 + 4
        let mut raw = vec![0x82, 0xff];
        raw.extend_from_slice(&65536u64.to_be_bytes());
        raw.extend_from_slice(&[9, 9, 9, 9]);
        let header = FrameHeader::from_prefix(&raw);
        assert!(!header.is_complete(13));
        assert!(header.is_complete(14));
        assert_eq!(header.payload_size(), 65536);
    }

    #[test]
    fn flag_bits_decode_independently() {
        let header = FrameHeader::from_prefix(&[0xf1, 0x00]);
        assert!(header.fin() && header.rsv1() && header.rsv2() && header.rsv3());
        assert_eq!(header.opcode(), Some(Opcode::Text));

        let header = FrameHeader::from_prefix(&[0x03, 0x00]);
        assert_eq!(header.opcode(), None, "reserved opcode");
    }

    #[test]
    fn text_frames_carry_the_utf8_payload() {
        let frame = Frame::text("salut");
        assert_eq!(frame.header.opcode(), Some(Opcode::Text));
        assert_eq!(&frame.head[..], b"salut");
        assert_eq!(frame.payload_size(), 5);
    }
}
