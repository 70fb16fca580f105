use super::request::Header;
use bytes::Bytes;

/// Status codes the runtime produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    SwitchingProtocols = 101,
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    NotImplemented = 501,
    VariantAlsoNegotiates = 506,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::SwitchingProtocols => "Switching Protocols",
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::VariantAlsoNegotiates => "Variant Also Negotiates",
        }
    }
}

/// An HTTP/1.1 response: status, ordered headers, body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<Header>,
    pub content: Bytes,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), content: Bytes::new() }
    }

    /// A canned response with the default HTML body for `status`.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.reason();
        let content = format!(
            "<html><head><title>{reason}</title></head><body><h1>{} {reason}</h1></body></html>",
            status.code()
        );
        let mut response = Self::new(status);
        response.content = Bytes::from(content);
        response.push_header("Content-Length", response.content.len().to_string());
        response.push_header("Content-Type", "text/html");
        response
    }

    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::new(name, value));
    }

    /// The value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Serializes the status line, headers and body as a buffer sequence
    /// ready for sequential writing.
    pub fn to_buffers(&self) -> Vec<Bytes> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status.code(), self.status.reason());
        for header in &self.headers {
            head.push_str(&header.name);
            head.push_str(": ");
            head.push_str(&header.value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut buffers = Vec::with_capacity(2);
        buffers.push(Bytes::from(head));
        if !self.content.is_empty() {
            buffers.push(self.content.clone());
        }
        buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(response: &Response) -> Vec<u8> {
        response.to_buffers().concat()
    }

    #[test]
    fn status_strings_are_exact() {
        assert_eq!(StatusCode::SwitchingProtocols.reason(), "Switching Protocols");
        assert_eq!(StatusCode::VariantAlsoNegotiates.code(), 506);
    }

    #[test]
    fn bad_request_serializes_with_the_default_body() {
        let response = Response::from_status(StatusCode::BadRequest);
        let wire = String::from_utf8(flatten(&response)).unwrap();
        assert!(wire.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(wire.contains("Content-Length: 89\r\n"));
        assert!(wire.contains("Content-Type: text/html\r\n"));
        assert!(wire.ends_with(
            "<html><head><title>Bad Request</title></head>\
             <body><h1>400 Bad Request</h1></body></html>"
        ));
    }

    #[test]
    fn head_and_body_are_separated_by_an_empty_line() {
        let mut response = Response::new(StatusCode::Ok);
        response.push_header("Content-Length", "2");
        response.content = Bytes::from_static(b"ok");
        let wire = flatten(&response);
        assert!(wire.windows(6).any(|w| w == &b"\r\n\r\nok"[..]));
    }

    #[test]
    fn a_bodyless_response_yields_a_single_buffer() {
        let response = Response::new(StatusCode::SwitchingProtocols);
        assert_eq!(response.to_buffers().len(), 1);
    }
}
