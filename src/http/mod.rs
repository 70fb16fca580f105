//! HTTP/1.1 support: request model and incremental parser, response
//! serialization, static-file dispatch and the WebSocket opening handshake.
//!
//! Only `GET` and `HEAD` are served; other methods parse fine and are
//! answered with `501 Not Implemented`. Responses always carry a
//! `Content-Length` matching the body.

mod handler;
mod mime;
mod parser;
mod request;
mod response;
pub mod uri;

pub use handler::{websocket_accept_key, RequestHandler, WEBLINK_PROTOCOL};
pub use mime::MimeType;
pub use parser::{FeedStatus, RequestParser};
pub use request::{Header, Method, Request};
pub use response::{Response, StatusCode};
