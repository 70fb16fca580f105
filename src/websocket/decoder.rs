//! Reassembly of one frame from arbitrarily chunked bytes.

use super::frame::{FrameHeader, Opcode, MAX_HEADER_SIZE};
use bytes::Bytes;

/// Outcome of feeding one chunk to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The frame is still incomplete; the whole chunk was consumed.
    NeedMore,
    /// The frame is complete after `consumed` bytes of the chunk; the rest
    /// belongs to the next frame.
    Complete { consumed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Starting,
    PartialHeader,
    DecodingPayload,
}

/// Per-connection frame decoder.
///
/// Call [`feed`](Self::feed) with incoming chunks until it reports
/// completion, read the opcode and payload, then [`reset`](Self::reset) for
/// the next frame. Masked payloads are unmasked on the fly with the mask
/// index carried across chunks; the payload buffer never grows beyond the
/// declared payload size.
#[derive(Debug)]
pub struct FrameDecoder {
    state: State,
    scratch: [u8; MAX_HEADER_SIZE],
    scratch_len: usize,
    mask: Option<[u8; 4]>,
    mask_index: usize,
    payload_size: usize,
    payload: Vec<u8>,
    opcode_bits: u8,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Starting,
            scratch: [0; MAX_HEADER_SIZE],
            scratch_len: 0,
            mask: None,
            mask_index: 0,
            payload_size: 0,
            payload: Vec::new(),
            opcode_bits: 0,
        }
    }

    /// The decoded opcode of the current frame; `None` for reserved bits.
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_bits(self.opcode_bits)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Moves the decoded payload out, leaving the decoder ready for `reset`.
    pub fn take_payload(&mut self) -> Bytes {
        Bytes::from(std::mem::take(&mut self.payload))
    }

    /// Clears all per-frame state and returns to the starting state.
    pub fn reset(&mut self) {
        self.state = State::Starting;
        self.scratch_len = 0;
        self.mask = None;
        self.mask_index = 0;
        self.payload_size = 0;
        self.payload.clear();
        self.opcode_bits = 0;
    }

    pub fn feed(&mut self, chunk: &[u8]) -> ChunkStatus {
        match self.state {
            State::Starting => {
                let probe = FrameHeader::from_prefix(chunk);
                if probe.is_complete(chunk.len()) {
                    let header_size = self.decode_header(&probe);
                    let consumed = header_size + self.decode_payload(&chunk[header_size..]);
                    if self.payload.len() == self.payload_size {
                        return ChunkStatus::Complete { consumed };
                    }
                    self.state = State::DecodingPayload;
                } else {
                    // the whole chunk is a header fragment
                    self.buffer_header(chunk);
                    self.state = State::PartialHeader;
                }
                ChunkStatus::NeedMore
            }
            State::PartialHeader => {
                let used = self.buffer_header(chunk);
                let probe = FrameHeader::from_prefix(&self.scratch);
                if probe.is_complete(self.scratch_len) {
                    self.decode_header(&probe);
                    let consumed = used + self.decode_payload(&chunk[used..]);
                    if self.payload.len() == self.payload_size {
                        return ChunkStatus::Complete { consumed };
                    }
                    self.state = State::DecodingPayload;
                }
                ChunkStatus::NeedMore
            }
            State::DecodingPayload => {
                let consumed = self.decode_payload(chunk);
                if self.payload.len() == self.payload_size {
                    ChunkStatus::Complete { consumed }
                } else {
                    ChunkStatus::NeedMore
                }
            }
        }
    }

    /// Copies header bytes into the scratch, stopping as soon as the header
    /// completes. Returns how many bytes of `chunk` were taken.
    fn buffer_header(&mut self, chunk: &[u8]) -> usize {
        for (index, &byte) in chunk.iter().enumerate() {
            self.scratch[self.scratch_len] = byte;
            self.scratch_len += 1;
            let probe = FrameHeader::from_prefix(&self.scratch[..self.scratch_len]);
            if probe.is_complete(self.scratch_len) {
                return index + 1;
            }
        }
        chunk.len()
    }

    /// Records the decoded header fields. Returns the header size.
    fn decode_header(&mut self, header: &FrameHeader) -> usize {
        self.payload_size = header.payload_size() as usize;
        self.mask = header.masking_key();
        self.opcode_bits = header.opcode_bits();
        self.payload.reserve(self.payload_size);
        header.header_size()
    }

    /// Unmasks and stores at most the declared remainder of the payload.
    /// Returns how many bytes of `chunk` were taken.
    fn decode_payload(&mut self, chunk: &[u8]) -> usize {
        let wanted = self.payload_size - self.payload.len();
        let take = wanted.min(chunk.len());
        match self.mask {
            Some(key) => {
                for &byte in &chunk[..take] {
                    self.payload.push(byte ^ key[self.mask_index % 4]);
                    self.mask_index += 1;
                }
            }
            None => self.payload.extend_from_slice(&chunk[..take]),
        }
        take
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a masked client-side frame for tests.
    fn masked_frame(opcode: Opcode, key: [u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut header = FrameHeader::new();
        header.set_fin(true);
        header.set_opcode(opcode);
        header.set_payload_size(payload.len() as u64);
        let mut wire = header.bytes().to_vec();
        wire[1] |= 0x80;
        wire.extend_from_slice(&key);
        wire.extend(payload.iter().enumerate().map(|(i, &b)| b ^ key[i % 4]));
        wire
    }

    #[test]
    fn a_masked_text_frame_split_mid_payload_decodes() {
        let key = [0x10, 0x11, 0x12, 0x13];
        let wire = masked_frame(Opcode::Text, key, b"Hello WS");
        let (first, second) = wire.split_at(7);

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(first), ChunkStatus::NeedMore);
        assert_eq!(decoder.feed(second), ChunkStatus::Complete { consumed: second.len() });
        assert_eq!(decoder.opcode(), Some(Opcode::Text));
        assert_eq!(decoder.payload(), b"Hello WS");
    }

    #[test]
    fn every_chunk_boundary_yields_the_same_frame() {
        let key = [0xde, 0xad, 0xbe, 0xef];
        let payload: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let wire = masked_frame(Opcode::Binary, key, &payload);

        for split in 1..wire.len() {
            let mut decoder = FrameDecoder::new();
            assert_eq!(decoder.feed(&wire[..split]), ChunkStatus::NeedMore, "split {split}");
            match decoder.feed(&wire[split..]) {
                ChunkStatus::Complete { consumed } => assert_eq!(consumed, wire.len() - split),
                ChunkStatus::NeedMore => panic!("split {split} never completed"),
            }
            assert_eq!(decoder.opcode(), Some(Opcode::Binary));
            assert_eq!(decoder.payload(), &payload[..]);
        }
    }

    #[test]
    fn byte_by_byte_feeding_tracks_the_mask_index() {
        let key = [1, 2, 3, 4];
        let wire = masked_frame(Opcode::Binary, key, b"0123456789");
        let mut decoder = FrameDecoder::new();
        let mut complete = false;
        for &byte in &wire {
            assert!(!complete);
            complete = matches!(decoder.feed(&[byte]), ChunkStatus::Complete { .. });
        }
        assert!(complete);
        assert_eq!(decoder.payload(), b"0123456789");
    }

    #[test]
    fn reset_prepares_for_the_next_frame() {
        let first = masked_frame(Opcode::Text, [5, 6, 7, 8], b"first");
        let second = masked_frame(Opcode::Binary, [9, 9, 9, 9], b"second");

        let mut decoder = FrameDecoder::new();
        assert!(matches!(decoder.feed(&first), ChunkStatus::Complete { .. }));
        assert_eq!(decoder.take_payload(), Bytes::from_static(b"first"));
        decoder.reset();

        assert!(matches!(decoder.feed(&second), ChunkStatus::Complete { .. }));
        assert_eq!(decoder.opcode(), Some(Opcode::Binary));
        assert_eq!(decoder.payload(), b"second");
    }

    #[test]
    fn two_frames_in_one_chunk_report_partial_consumption() {
        let mut wire = masked_frame(Opcode::Text, [0, 0, 0, 0], b"one");
        let first_len = wire.len();
        wire.extend(masked_frame(Opcode::Text, [0, 0, 0, 0], b"two"));

        let mut decoder = FrameDecoder::new();
        match decoder.feed(&wire) {
            ChunkStatus::Complete { consumed } => assert_eq!(consumed, first_len),
            ChunkStatus::NeedMore => panic!("first frame should complete"),
        }
        assert_eq!(decoder.payload(), b"one");
        decoder.reset();
        assert!(matches!(decoder.feed(&wire[first_len..]), ChunkStatus::Complete { .. }));
        assert_eq!(decoder.payload(), b"two");
    }

    #[test]
    fn an_unmasked_zero_payload_close_frame_completes_immediately() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(&[0x88, 0x00]), ChunkStatus::Complete { consumed: 2 });
        assert_eq!(decoder.opcode(), Some(Opcode::ConnectionClose));
        assert!(decoder.payload().is_empty());
    }

    #[test]
    fn the_payload_never_exceeds_the_declared_size() {
        let wire = masked_frame(Opcode::Binary, [7, 7, 7, 7], &[0xaa; 300]);
        let mut decoder = FrameDecoder::new();
        for chunk in wire.chunks(11) {
            decoder.feed(chunk);
            assert!(decoder.payload().len() <= 300);
        }
        assert_eq!(decoder.payload().len(), 300);
    }
}
