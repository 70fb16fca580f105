use std::io;

/// Errors surfaced by the runtime.
///
/// Parse errors are local to one request or one message: the HTTP layer
/// answers a [`BadRequest`](Error::BadRequest) with a `400` and closes, the
/// WebLink layer logs the offending message and drops it. Transport errors
/// end the connection they occurred on.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request violated the HTTP/1.1 grammar accepted by
    /// [`RequestParser`](crate::http::RequestParser).
    #[error("bad HTTP request")]
    BadRequest,

    /// A WebLink message was shorter than its command header.
    #[error("truncated command header")]
    ShortHeader,

    /// A WebLink message declared more payload than was received.
    #[error("truncated command payload")]
    ShortPayload,

    /// The first byte of a WebLink message is not a known command.
    #[error("unknown command byte {0:#04x}")]
    UnknownCommand(u8),

    /// A coded parameter carried an unknown type tag.
    #[error("unknown parameter tag {0:#04x}")]
    UnknownParameterTag(u8),

    /// A coded parameter declared a length that exceeds the remaining data.
    #[error("parameter length exceeds the remaining data")]
    LengthOverflow,

    /// The browser invoked a function name with no registered counterpart.
    #[error("no registered function named `{0}`")]
    UnknownFunction(String),

    /// A decoded parameter did not match the registered signature, or an
    /// outbound value cannot be represented on the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The WebLink's socket tasks have gone away.
    #[error("weblink is closed")]
    LinkClosed,

    /// Transport failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// `true` for transport endings that count as a clean termination rather
    /// than a failure (the peer went away, or the socket was closed under an
    /// in-flight operation).
    pub fn is_clean_close(&self) -> bool {
        match self {
            Error::Io(err) => is_disconnect(err.kind()),
            _ => false,
        }
    }
}

pub(crate) fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
    )
}
