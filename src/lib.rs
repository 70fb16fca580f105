//! webfront is an embedded web-front runtime: a single process owns an
//! HTTP/1.1 endpoint, serves a browser UI from a composable (possibly
//! in-memory) virtual filesystem, upgrades selected connections to WebSocket,
//! and multiplexes a binary function-call protocol over each upgraded socket
//! so native code can invoke JavaScript functions and vice versa.
//!
//! # Example
//!
//! ```no_run
//! use webfront::fs::{IndexFs, NativeFs};
//! use webfront::WebFront;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), webfront::Error> {
//!     // Try the document root first, fall back to the bundled index page.
//!     let fs = (NativeFs::new("./web"), IndexFs);
//!     let server = WebFront::bind("0.0.0.0:9002", fs).await?;
//!
//!     server.register_function("print", |text: String| println!("{text}"));
//!
//!     server.on_ui_started(|ui| {
//!         let _ = ui.add_script(
//!             "var addText = function(text, num) {          \n\
//!                let print = webFront.cppFunction('print'); \n\
//!                print(text + ' of ' + num);                \n\
//!              }                                            \n",
//!         );
//!         let _ = ui.js_function("addText").call(("Hello World", 2022));
//!     });
//!
//!     server.run().await
//! }
//! ```
//!
//! # Protocol stack
//!
//! - [`http`] — a byte-wise incremental request parser, static-file dispatch
//!   with content-encoding negotiation, and the RFC 6455 opening handshake.
//! - [`websocket`] — the frame codec and the per-connection decoder state
//!   machine (masking, fragmented headers, partial-payload reassembly).
//! - [`weblink`] — the command layer carried over WebSocket frames: typed
//!   parameter encoding for cross-runtime calls and session lifecycle.
//! - [`fs`] — virtual filesystem backends: native disk, static in-memory
//!   asset tables, and tuple composition.
//! - [`server`] — the facade tying it together: accept loop, connection
//!   protocol transitions, registries and lifecycle hooks.
//!
//! Calls between the runtimes are fire-and-forget; the wire protocol
//! reserves a return-value envelope but no correlation exists yet.
//!
//! # Logging
//!
//! The runtime reports through [`tracing`] and mirrors its lines to the
//! process-wide sink table in [`logging`]; each linked page automatically
//! receives server log lines in its browser console.

mod error;
pub mod fs;
pub mod http;
pub mod logging;
pub mod server;
mod util;
pub mod weblink;
pub mod websocket;

pub use error::Error;
pub use server::{StopHandle, WebFront, UI};
pub use weblink::{JsFunction, WebLinkEvent, WebLinkId};
