//! Maps parsed requests to responses: static files, upgrade handshakes,
//! canned errors.

use super::mime::MimeType;
use super::request::{Method, Request};
use super::response::{Response, StatusCode};
use super::uri;
use crate::fs::Filesystem;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// The WebSocket subprotocol offered in `101` responses.
pub const WEBLINK_PROTOCOL: &str = "WebFront_0.1";

const WEBSOCKET_GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Computes the RFC 6455 `Sec-WebSocket-Accept` value for a client key. The
/// digest is serialized most-significant word first, as the RFC requires,
/// before base64.
pub fn websocket_accept_key(key: &str) -> String {
    let mut sha1 = Sha1::default();
    sha1.update(key.as_bytes());
    sha1.update(WEBSOCKET_GUID);
    BASE64.encode(sha1.finalize())
}

/// Serves GET/HEAD from a read-only [`Filesystem`] and answers WebSocket
/// upgrade requests.
#[derive(Debug)]
pub struct RequestHandler<FS> {
    fs: FS,
}

impl<FS: Filesystem> RequestHandler<FS> {
    pub fn new(fs: FS) -> Self {
        Self { fs }
    }

    /// Produces the response for one complete request.
    pub fn handle(&self, request: &Request) -> Response {
        let mut path = uri::decode(&request.uri);
        if path.is_empty() || !path.starts_with('/') || path.contains("..") {
            return Response::from_status(StatusCode::BadRequest);
        }
        if path.ends_with('/') {
            path.push_str("index.html");
        }

        match request.method {
            Method::Get | Method::Head => {}
            _ => return Response::from_status(StatusCode::NotImplemented),
        }

        if request.method == Method::Get && request.is_upgrade_request("websocket") {
            if let Some(key) = request.header_value("Sec-WebSocket-Key") {
                return upgrade_response(key);
            }
        }

        let Some(file) = self.fs.open(path.trim_start_matches('/')) else {
            return Response::from_status(StatusCode::NotFound);
        };

        let mut response = Response::new(StatusCode::Ok);
        let encoding = file.encoding();
        if let Some(encoding) = encoding {
            if !request.headers_contain("Accept-Encoding", encoding) {
                return Response::from_status(StatusCode::VariantAlsoNegotiates);
            }
        }

        let content = match request.method {
            Method::Get => file.into_content(),
            _ => Bytes::new(),
        };
        response.push_header("Content-Length", content.len().to_string());
        response.push_header("Content-Type", MimeType::from_path(&path).as_str());
        if let Some(encoding) = encoding {
            response.push_header("Content-Encoding", encoding);
        }
        response.content = content;
        response
    }
}

fn upgrade_response(key: &str) -> Response {
    let mut response = Response::new(StatusCode::SwitchingProtocols);
    response.push_header("Upgrade", "websocket");
    response.push_header("Connection", "Upgrade");
    response.push_header("Sec-WebSocket-Accept", websocket_accept_key(key));
    response.push_header("Sec-WebSocket-Protocol", WEBLINK_PROTOCOL);
    response
}
