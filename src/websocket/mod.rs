//! WebSocket endpoint: a read loop that drives the frame decoder and a write
//! path that emits single unmasked frames.
//!
//! The endpoint is split into an owned reader and writer half so one task can
//! block on inbound frames while another drains an outbound queue. Writes are
//! serialized by `&mut` — there is at most one outstanding write per
//! endpoint; callers needing concurrent producers must funnel through a
//! channel.

mod decoder;
mod frame;

pub use decoder::{ChunkStatus, FrameDecoder};
pub use frame::{Frame, FrameHeader, Opcode};

use crate::error::{is_disconnect, Error};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_CHUNK: usize = 8192;

/// Close notification delivered when the peer ends the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseEvent {
    pub status: u16,
    pub reason: String,
}

/// A complete, single-frame message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Binary(Bytes),
    Close(CloseEvent),
}

/// Read half of an upgraded socket.
pub struct WebSocketReader<R> {
    stream: R,
    decoder: FrameDecoder,
    buffer: Box<[u8; READ_CHUNK]>,
    /// Bytes already received but not yet decoded: the tail of the previous
    /// protocol stage, or of a chunk that carried more than one frame.
    spill: Vec<u8>,
}

impl<R: AsyncRead + Unpin> WebSocketReader<R> {
    pub fn new(stream: R) -> Self {
        Self::with_spill(stream, Vec::new())
    }

    /// A reader whose first decoded bytes are `spill` — data the peer sent
    /// glued to the tail of its upgrade request.
    pub fn with_spill(stream: R, spill: Vec<u8>) -> Self {
        Self { stream, decoder: FrameDecoder::new(), buffer: Box::new([0; READ_CHUNK]), spill }
    }

    /// The next complete message, in wire order. `Ok(None)` is a clean peer
    /// disconnect. Ping and pong frames are accepted and dropped.
    pub async fn next_message(&mut self) -> Result<Option<Message>, Error> {
        loop {
            let chunk: Vec<u8> = if !self.spill.is_empty() {
                std::mem::take(&mut self.spill)
            } else {
                let count = match self.stream.read(&mut self.buffer[..]).await {
                    Ok(0) => return Ok(None),
                    Ok(count) => count,
                    Err(err) if is_disconnect(err.kind()) => return Ok(None),
                    Err(err) => return Err(err.into()),
                };
                self.buffer[..count].to_vec()
            };

            match self.decoder.feed(&chunk) {
                ChunkStatus::NeedMore => {}
                ChunkStatus::Complete { consumed } => {
                    if consumed < chunk.len() {
                        self.spill = chunk[consumed..].to_vec();
                    }
                    if let Some(message) = self.finish_frame() {
                        return Ok(Some(message));
                    }
                }
            }
        }
    }

    fn finish_frame(&mut self) -> Option<Message> {
        let opcode = self.decoder.opcode();
        let payload = self.decoder.take_payload();
        self.decoder.reset();
        match opcode {
            Some(Opcode::Text) => {
                Some(Message::Text(String::from_utf8_lossy(&payload).into_owned()))
            }
            Some(Opcode::Binary) => Some(Message::Binary(payload)),
            Some(Opcode::ConnectionClose) => Some(Message::Close(close_event(&payload))),
            Some(Opcode::Ping | Opcode::Pong) => None,
            Some(Opcode::Continuation) | None => {
                tracing::warn!(target: "webfront", "dropping unsupported frame");
                None
            }
        }
    }
}

fn close_event(payload: &[u8]) -> CloseEvent {
    if payload.len() >= 2 {
        CloseEvent {
            status: u16::from_be_bytes([payload[0], payload[1]]),
            reason: String::from_utf8_lossy(&payload[2..]).into_owned(),
        }
    } else {
        CloseEvent::default()
    }
}

/// Write half of an upgraded socket.
pub struct WebSocketWriter<W> {
    stream: W,
}

impl<W: AsyncWrite + Unpin> WebSocketWriter<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    /// Sends one binary frame assembled from up to two payload spans.
    pub async fn write_binary(&mut self, head: Bytes, tail: Bytes) -> Result<(), Error> {
        self.write_frame(Frame::binary(head, tail)).await
    }

    /// Sends one text frame.
    pub async fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.write_frame(Frame::text(text)).await
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.stream.write_all(frame.header.bytes()).await?;
        if !frame.head.is_empty() {
            self.stream.write_all(&frame.head).await?;
        }
        if !frame.tail.is_empty() {
            self.stream.write_all(&frame.tail).await?;
        }
        self.stream.flush().await?;
        Ok(())
    }
}
