//! The server facade: accept loop, per-socket HTTP connections, upgrade
//! handoff to WebLink sessions, and the user-facing registries.

use crate::error::{is_disconnect, Error};
use crate::fs::Filesystem;
use crate::http::{FeedStatus, RequestHandler, RequestParser, Response, StatusCode};
use crate::logging;
use crate::weblink::function::{BoxedCppFunction, CppFunction, JsFunction};
use crate::weblink::{LinkHandle, Outgoing, WebLink, WebLinkEvent, WebLinkId};
use crate::weblink::messages::TxtOpcode;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

const READ_CHUNK: usize = 8192;

/// How serving one request ended.
enum Served {
    Closed,
    /// The socket switched protocols; `spill` is whatever the peer sent
    /// behind the upgrade request.
    Upgraded { stream: TcpStream, spill: Vec<u8> },
}

/// One accepted socket in HTTP mode.
///
/// Reads, feeds the parser, writes the handler's response, then either loops
/// (keep-alive), closes, or hands the socket over on a `101`. Request N+1 is
/// not parsed before response N is fully written.
struct Connection<FS> {
    stream: TcpStream,
    handler: Arc<RequestHandler<FS>>,
    parser: RequestParser,
    keep_alive: bool,
}

impl<FS: Filesystem> Connection<FS> {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Served {
        let mut buffer = vec![0u8; READ_CHUNK];
        loop {
            let count = tokio::select! {
                read = self.stream.read(&mut buffer) => match read {
                    Ok(0) => return Served::Closed,
                    Ok(count) => count,
                    Err(err) => {
                        if !is_disconnect(err.kind()) {
                            tracing::debug!(target: "webfront", "connection read error: {err}");
                        }
                        return Served::Closed;
                    }
                },
                _ = shutdown.changed() => return Served::Closed,
            };

            let mut offset = 0;
            while offset < count {
                match self.parser.feed(&buffer[offset..count]) {
                    Ok(FeedStatus::NeedMore) => offset = count,
                    Ok(FeedStatus::Complete { consumed }) => {
                        offset += consumed;
                        let request = self.parser.take_request();
                        self.parser.reset();
                        let response = self.handler.handle(&request);

                        let upgrading = response.status == StatusCode::SwitchingProtocols;
                        if let Err(err) = self.write_response(&response).await {
                            if !err.is_clean_close() {
                                tracing::debug!(target: "webfront", "response write failed: {err}");
                            }
                            return Served::Closed;
                        }
                        if upgrading {
                            return Served::Upgraded {
                                spill: buffer[offset..count].to_vec(),
                                stream: self.stream,
                            };
                        }

                        let close = !self.keep_alive
                            || response.status != StatusCode::Ok
                            || request.headers_contain("Connection", "close");
                        if close {
                            let _ = self.stream.shutdown().await;
                            return Served::Closed;
                        }
                    }
                    Err(_) => {
                        let response = Response::from_status(StatusCode::BadRequest);
                        let _ = self.write_response(&response).await;
                        let _ = self.stream.shutdown().await;
                        return Served::Closed;
                    }
                }
            }
        }
    }

    async fn write_response(&mut self, response: &Response) -> Result<(), Error> {
        for buffer in response.to_buffers() {
            self.stream.write_all(&buffer).await?;
        }
        self.stream.flush().await?;
        Ok(())
    }
}

/// Handle on one linked page, passed to the `on_ui_started` hook.
#[derive(Clone)]
pub struct UI {
    link: LinkHandle,
}

impl UI {
    /// Identifier of the underlying WebLink.
    pub fn weblink_id(&self) -> WebLinkId {
        self.link.id
    }

    /// Injects a script into the page.
    pub fn add_script(&self, script: &str) -> Result<(), Error> {
        self.link.send(Outgoing::Text { opcode: TxtOpcode::InjectScript, text: script.to_owned() })
    }

    /// An invocable proxy for the JavaScript function `name`.
    pub fn js_function(&self, name: &str) -> JsFunction {
        JsFunction::new(name, self.link.clone())
    }
}

type UiHook = Arc<dyn Fn(UI) + Send + Sync>;

struct Inner<FS> {
    handler: Arc<RequestHandler<FS>>,
    functions: Mutex<HashMap<String, BoxedCppFunction>>,
    links: Mutex<HashMap<WebLinkId, LinkHandle>>,
    next_link_id: AtomicU16,
    on_ui_started: Mutex<Option<UiHook>>,
}

impl<FS: Filesystem + Send + Sync + 'static> Inner<FS> {
    fn upgrade(self: &Arc<Self>, stream: TcpStream, spill: Vec<u8>, shutdown: watch::Receiver<bool>) {
        let id = self.allocate_link_id();
        let inner = self.clone();
        let events = Arc::new(move |event| inner.on_event(event));
        let (handle, link) = WebLink::new(stream, spill, id, events, shutdown);
        self.links.lock().unwrap().insert(id, handle);
        logging::debug(format!("weblink {id} created"));
        link.start();
    }

    fn allocate_link_id(&self) -> WebLinkId {
        let links = self.links.lock().unwrap();
        loop {
            let id = self.next_link_id.fetch_add(1, Ordering::Relaxed);
            if !links.contains_key(&id) {
                return id;
            }
        }
    }

    fn on_event(&self, event: WebLinkEvent) {
        match event {
            WebLinkEvent::Linked(id) => {
                let hook = self.on_ui_started.lock().unwrap().clone();
                let handle = self.links.lock().unwrap().get(&id).cloned();
                if let (Some(hook), Some(link)) = (hook, handle) {
                    hook(UI { link });
                }
            }
            WebLinkEvent::Closed(id) => {
                self.links.lock().unwrap().remove(&id);
                logging::debug(format!("weblink {id} removed"));
            }
            WebLinkEvent::CppFunctionCalled { id, name, mut args } => {
                let functions = self.functions.lock().unwrap();
                match functions.get(&name) {
                    Some(function) => {
                        if let Err(err) = function(&mut args) {
                            logging::warn(format!(
                                "weblink {id}: call to `{name}` dropped: {err}"
                            ));
                        }
                    }
                    None => {
                        logging::warn(format!(
                            "weblink {id}: call to unregistered function `{name}` dropped"
                        ));
                    }
                }
            }
        }
    }
}

/// The web-front runtime: an HTTP/1.1 + WebSocket server bound to one
/// address, serving a [`Filesystem`] and bridging function calls to and from
/// every connected page.
///
/// See the [crate docs](crate) for a complete example.
pub struct WebFront<FS> {
    listener: TcpListener,
    inner: Arc<Inner<FS>>,
    shutdown: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    single_request: bool,
}

impl<FS: Filesystem + Send + Sync + 'static> WebFront<FS> {
    /// Binds `addr` and readies the server. No connection is accepted until
    /// [`run`](Self::run).
    pub async fn bind(addr: &str, fs: FS) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        Ok(Self {
            listener,
            inner: Arc::new(Inner {
                handler: Arc::new(RequestHandler::new(fs)),
                functions: Mutex::new(HashMap::new()),
                links: Mutex::new(HashMap::new()),
                next_link_id: AtomicU16::new(0),
                on_ui_started: Mutex::new(None),
            }),
            shutdown,
            shutdown_rx,
            single_request: false,
        })
    }

    /// The bound address — useful after binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Restores the close-after-every-response policy instead of HTTP/1.1
    /// keep-alive.
    pub fn single_request_connections(mut self, enabled: bool) -> Self {
        self.single_request = enabled;
        self
    }

    /// Registers a native function the page can invoke as
    /// `webFront.cppFunction(name)`. The closure's parameter types define the
    /// expected wire signature. Registration is meant to happen before
    /// [`run`](Self::run).
    pub fn register_function<Args, F>(&self, name: impl Into<String>, function: F)
    where
        F: CppFunction<Args>,
    {
        self.inner.functions.lock().unwrap().insert(name.into(), function.erase());
    }

    /// Sets the hook fired each time a page completes the WebLink handshake.
    pub fn on_ui_started(&self, hook: impl Fn(UI) + Send + Sync + 'static) {
        *self.inner.on_ui_started.lock().unwrap() = Some(Arc::new(hook));
    }

    /// A handle that can stop the server from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { shutdown: self.shutdown.clone() }
    }

    /// Accepts and serves connections until [`StopHandle::stop_all`] fires
    /// or the listener dies.
    pub async fn run(&self) -> Result<(), Error> {
        let mut shutdown = self.shutdown_rx.clone();
        logging::info(format!("webfront listening on {}", self.listener.local_addr()?));
        loop {
            let (stream, remote) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        tracing::warn!(target: "webfront", "accept failed: {err}");
                        continue;
                    }
                },
                _ = shutdown.changed() => {
                    logging::info("webfront stopped");
                    return Ok(());
                }
            };
            tracing::debug!(target: "webfront", %remote, "connection accepted");

            let inner = self.inner.clone();
            let keep_alive = !self.single_request;
            let shutdown_rx = self.shutdown_rx.clone();
            tokio::spawn(async move {
                let connection = Connection {
                    stream,
                    handler: inner.handler.clone(),
                    parser: RequestParser::new(),
                    keep_alive,
                };
                match connection.run(shutdown_rx.clone()).await {
                    Served::Closed => {}
                    Served::Upgraded { stream, spill } => inner.upgrade(stream, spill, shutdown_rx),
                }
            });
        }
    }
}

/// Stops every live connection and makes [`WebFront::run`] return.
#[derive(Clone)]
pub struct StopHandle {
    shutdown: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop_all(&self) {
        let _ = self.shutdown.send(true);
    }
}
