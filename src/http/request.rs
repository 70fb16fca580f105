/// HTTP request methods understood by the parser.
///
/// Anything else parses to [`Undefined`](Method::Undefined) and is rejected
/// with a `501` by the request handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    #[default]
    Undefined,
}

impl Method {
    pub(crate) fn from_token(token: &str) -> Self {
        match token {
            "CONNECT" => Method::Connect,
            "DELETE" => Method::Delete,
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "TRACE" => Method::Trace,
            _ => Method::Undefined,
        }
    }
}

/// One `name: value` pair, kept in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// A parsed HTTP/1.x request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Method,
    /// Request target as received; percent-decoded lazily by the handler.
    pub uri: String,
    pub http_version_major: u32,
    pub http_version_minor: u32,
    pub headers: Vec<Header>,
}

impl Request {
    /// The value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Values of every header named `name` — headers such as
    /// `Accept-Encoding` may legally repeat.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// `true` if any header named `name` contains `token`, case-insensitive.
    pub fn headers_contain(&self, name: &str, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        self.header_values(name)
            .any(|value| value.to_ascii_lowercase().contains(&token))
    }

    /// RFC 6455 opening-handshake shape: `Connection: upgrade` plus
    /// `Upgrade: <protocol>`.
    pub fn is_upgrade_request(&self, protocol: &str) -> bool {
        self.headers_contain("Connection", "upgrade") && self.headers_contain("Upgrade", protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        Request {
            method: Method::Get,
            uri: "/".to_owned(),
            http_version_major: 1,
            http_version_minor: 1,
            headers: headers.iter().map(|(n, v)| Header::new(*n, *v)).collect(),
        }
    }

    #[test]
    fn header_lookup_ignores_name_case() {
        let request = request_with_headers(&[("Accept-Language", "en-us")]);
        assert_eq!(request.header_value("accept-language"), Some("en-us"));
        assert_eq!(request.header_value("Bozo-Le-Clown"), None);
    }

    #[test]
    fn repeated_headers_are_all_retained() {
        let request =
            request_with_headers(&[("Accept-Encoding", "gzip"), ("Accept-Encoding", "deflate")]);
        assert_eq!(request.header_values("Accept-Encoding").count(), 2);
        assert!(request.headers_contain("Accept-Encoding", "gzip"));
        assert!(request.headers_contain("Accept-Encoding", "deflate"));
        assert!(!request.headers_contain("Accept-Encoding", "br"));
    }

    #[test]
    fn upgrade_detection_matches_tokens_case_insensitively() {
        let request = request_with_headers(&[
            ("Connection", "keep-alive, Upgrade"),
            ("Upgrade", "WebSocket"),
        ]);
        assert!(request.is_upgrade_request("websocket"));

        let request = request_with_headers(&[("Connection", "keep-alive")]);
        assert!(!request.is_upgrade_request("websocket"));
    }

    #[test]
    fn unknown_method_tokens_map_to_undefined() {
        assert_eq!(Method::from_token("GET"), Method::Get);
        assert_eq!(Method::from_token("BREW"), Method::Undefined);
        assert_eq!(Method::from_token("get"), Method::Undefined);
    }
}
