//! The WebLink session: one linked browser page per upgraded socket.
//!
//! A session starts `unlinked`. The first binary frame from the page must be
//! a Handshake carrying the client's byte order; the session answers with an
//! Ack, registers a log sink that mirrors server logs into the browser
//! console, and becomes `linked`. From then on the page can invoke registered
//! native functions and the host can inject scripts or invoke JavaScript
//! functions, until the socket closes.
//!
//! All outbound traffic funnels through a per-link channel into a single
//! writer task, which keeps writes serialized.

pub mod function;
pub mod messages;

pub use function::{CallArgs, CppFunction, FromParameter, IntoParameter, JsFunction};

use crate::error::Error;
use crate::logging;
use crate::util;
use crate::websocket::{Message, WebSocketReader, WebSocketWriter};
use bytes::Bytes;
use messages::{JsEndian, ParamReader, ParamValue, TxtOpcode, WebLinkMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

/// 16-bit identifier of one browser session.
pub type WebLinkId = u16;

/// Events a WebLink session reports to its owner.
#[derive(Debug)]
pub enum WebLinkEvent {
    /// The handshake completed; the page is ready for function calls.
    Linked(WebLinkId),
    /// The socket closed; the session is gone.
    Closed(WebLinkId),
    /// The page invoked a native function. `args` holds the parameters after
    /// the name, still encoded, for iterative extraction.
    CppFunctionCalled { id: WebLinkId, name: String, args: ParamReader },
}

pub(crate) type EventHandler = Arc<dyn Fn(WebLinkEvent) + Send + Sync>;

/// Commands queued for the writer task.
#[derive(Debug)]
pub(crate) enum Outgoing {
    Ack,
    Text { opcode: TxtOpcode, text: String },
    FunctionCall { count: u8, params: Bytes },
}

/// Cheap handle used to enqueue outbound commands on a link.
#[derive(Debug, Clone)]
pub(crate) struct LinkHandle {
    pub(crate) id: WebLinkId,
    sender: mpsc::UnboundedSender<Outgoing>,
    same_endian: Arc<AtomicBool>,
}

impl LinkHandle {
    pub(crate) fn same_endian(&self) -> bool {
        self.same_endian.load(Ordering::Relaxed)
    }

    pub(crate) fn send(&self, outgoing: Outgoing) -> Result<(), Error> {
        self.sender.send(outgoing).map_err(|_| Error::LinkClosed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unlinked,
    Linked,
    Closed,
}

/// A not-yet-started session over a freshly upgraded socket.
///
/// Splitting construction from [`start`](Self::start) lets the owner insert
/// the handle into its registry before the first frame can arrive.
pub(crate) struct WebLink {
    reader: WebSocketReader<OwnedReadHalf>,
    writer: WebSocketWriter<OwnedWriteHalf>,
    receiver: mpsc::UnboundedReceiver<Outgoing>,
    handle: LinkHandle,
    events: EventHandler,
    shutdown: watch::Receiver<bool>,
}

impl WebLink {
    pub(crate) fn new(
        stream: TcpStream,
        spill: Vec<u8>,
        id: WebLinkId,
        events: EventHandler,
        shutdown: watch::Receiver<bool>,
    ) -> (LinkHandle, WebLink) {
        let (read_half, write_half) = stream.into_split();
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = LinkHandle { id, sender, same_endian: Arc::new(AtomicBool::new(true)) };
        let link = WebLink {
            reader: WebSocketReader::with_spill(read_half, spill),
            writer: WebSocketWriter::new(write_half),
            receiver,
            handle: handle.clone(),
            events,
            shutdown,
        };
        (handle, link)
    }

    /// Spawns the read and write tasks of this session.
    pub(crate) fn start(self) {
        let WebLink { reader, writer, receiver, handle, events, shutdown } = self;
        let endian = handle.same_endian.clone();
        tokio::spawn(write_loop(writer, receiver, endian));
        tokio::spawn(read_loop(reader, handle, events, shutdown));
    }
}

async fn read_loop(
    mut reader: WebSocketReader<OwnedReadHalf>,
    handle: LinkHandle,
    events: EventHandler,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut state = SessionState::Unlinked;
    let mut log_sink = None;
    loop {
        let message = tokio::select! {
            message = reader.next_message() => message,
            _ = shutdown.changed() => break,
        };
        match message {
            Ok(Some(Message::Binary(data))) => {
                tracing::trace!(target: "webfront", link = handle.id, "inbound command\n{}", util::hex_dump(&data));
                if let Err(err) =
                    handle_command(&data, &handle, &events, &mut state, &mut log_sink)
                {
                    logging::warn(format!(
                        "weblink {}: dropping malformed message: {err}",
                        handle.id
                    ));
                }
            }
            Ok(Some(Message::Text(text))) => {
                tracing::debug!(target: "webfront", link = handle.id, "unexpected text frame: {text}");
            }
            Ok(Some(Message::Close(event))) => {
                logging::debug(format!(
                    "weblink {} closed by peer (status {})",
                    handle.id, event.status
                ));
                break;
            }
            Ok(None) => break,
            Err(err) => {
                if !err.is_clean_close() {
                    logging::error(format!("weblink {} transport error: {err}", handle.id));
                }
                break;
            }
        }
    }
    state = SessionState::Closed;
    if let Some(index) = log_sink {
        logging::remove_sink(index);
    }
    tracing::trace!(target: "webfront", link = handle.id, ?state, "session ended");
    events(WebLinkEvent::Closed(handle.id));
}

fn handle_command(
    data: &[u8],
    handle: &LinkHandle,
    events: &EventHandler,
    state: &mut SessionState,
    log_sink: &mut Option<usize>,
) -> Result<(), Error> {
    match WebLinkMessage::parse(data, handle.same_endian())? {
        WebLinkMessage::Handshake { endian } => {
            let same_endian = endian == JsEndian::native();
            handle.same_endian.store(same_endian, Ordering::Relaxed);
            handle.send(Outgoing::Ack)?;
            let sink_handle = handle.clone();
            *log_sink = Some(logging::add_sink(move |line| {
                let _ = sink_handle
                    .send(Outgoing::Text { opcode: TxtOpcode::DebugLog, text: line.to_owned() });
            }));
            *state = SessionState::Linked;
            logging::debug(format!("weblink {} linked (same endian: {same_endian})", handle.id));
            events(WebLinkEvent::Linked(handle.id));
        }
        WebLinkMessage::FunctionCall { param_count, params } => {
            if *state != SessionState::Linked {
                return Err(Error::InvalidArgument("function call before handshake"));
            }
            if param_count == 0 {
                return Err(Error::InvalidArgument("function call without a name"));
            }
            let mut args = ParamReader::new(params, handle.same_endian());
            let name = match args.next_value()? {
                ParamValue::Text(name) => name,
                _ => return Err(Error::InvalidArgument("function name must be a string")),
            };
            events(WebLinkEvent::CppFunctionCalled { id: handle.id, name, args });
        }
        WebLinkMessage::Text { opcode: TxtOpcode::DebugLog, text } => {
            tracing::debug!(target: "webfront", link = handle.id, "client log: {text}");
        }
        WebLinkMessage::Text { opcode: TxtOpcode::InjectScript, .. } => {
            tracing::warn!(target: "webfront", link = handle.id, "client attempted script injection");
        }
        WebLinkMessage::Ack { .. } => {
            tracing::debug!(target: "webfront", link = handle.id, "unexpected ack from client");
        }
        WebLinkMessage::FunctionReturn { .. } => {
            // calls are fire-and-forget; nothing awaits this value
            tracing::debug!(target: "webfront", link = handle.id, "discarding function return");
        }
    }
    Ok(())
}

async fn write_loop(
    mut writer: WebSocketWriter<OwnedWriteHalf>,
    mut receiver: mpsc::UnboundedReceiver<Outgoing>,
    same_endian: Arc<AtomicBool>,
) {
    while let Some(outgoing) = receiver.recv().await {
        let result = match outgoing {
            Outgoing::Ack => writer.write_binary(messages::encode_ack(), Bytes::new()).await,
            Outgoing::Text { opcode, text } => match messages::encode_text_command(opcode, &text) {
                Ok((header, payload)) => writer.write_binary(header, payload).await,
                Err(err) => {
                    tracing::warn!(target: "webfront", "skipping oversized text command: {err}");
                    continue;
                }
            },
            Outgoing::FunctionCall { count, params } => {
                let (header, payload) =
                    messages::encode_function_call(count, params, same_endian.load(Ordering::Relaxed));
                writer.write_binary(header, payload).await
            }
        };
        if let Err(err) = result {
            if !err.is_clean_close() {
                tracing::debug!(target: "webfront", "weblink write failed: {err}");
            }
            break;
        }
    }
}
