//! Byte-driven HTTP/1.x request parser.
//!
//! The parser accepts any chunking of the input: feeding a request one byte
//! at a time produces the same [`Request`] as feeding it whole. It never
//! looks past the terminating empty line, and reports how many bytes of the
//! final chunk it consumed so pipelined bytes (typically the first WebSocket
//! frame behind an upgrade request) survive to the next protocol stage.

use super::request::{Header, Method, Request};
use crate::error::Error;

/// Outcome of one [`RequestParser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The request is still incomplete; the whole chunk was consumed.
    NeedMore,
    /// The terminating empty line was seen after `consumed` bytes of the
    /// chunk; the rest belongs to whatever follows the request.
    Complete { consumed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    MethodStart,
    Method,
    Uri,
    VersionH,
    VersionT1,
    VersionT2,
    VersionP,
    VersionSlash,
    VersionMajorStart,
    VersionMajor,
    VersionMinorStart,
    VersionMinor,
    Newline1,
    HeaderLineStart,
    HeaderLws,
    HeaderName,
    SpaceBeforeHeaderValue,
    HeaderValue,
    Newline2,
    Newline3,
    Done,
    Failed,
}

/// Incremental request parser; restartable with [`reset`](Self::reset).
#[derive(Debug)]
pub struct RequestParser {
    state: State,
    request: Request,
    method_token: String,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self { state: State::MethodStart, request: Request::default(), method_token: String::new() }
    }

    /// Discards any partial parse and readies the parser for a new request.
    pub fn reset(&mut self) {
        self.state = State::MethodStart;
        self.request = Request::default();
        self.method_token.clear();
    }

    /// Consumes bytes until the request completes, the chunk runs out, or the
    /// grammar is violated. After an error the parser refuses further input
    /// until [`reset`](Self::reset).
    pub fn feed(&mut self, bytes: &[u8]) -> Result<FeedStatus, Error> {
        if self.state == State::Failed {
            return Err(Error::BadRequest);
        }
        if self.state == State::Done {
            return Ok(FeedStatus::Complete { consumed: 0 });
        }
        for (index, &byte) in bytes.iter().enumerate() {
            if self.advance(byte)? {
                return Ok(FeedStatus::Complete { consumed: index + 1 });
            }
        }
        Ok(FeedStatus::NeedMore)
    }

    /// The parsed request. Meaningful only after `feed` returned
    /// [`FeedStatus::Complete`]; leaves a default request behind.
    pub fn take_request(&mut self) -> Request {
        std::mem::take(&mut self.request)
    }

    fn fail(&mut self) -> Result<bool, Error> {
        self.state = State::Failed;
        Err(Error::BadRequest)
    }

    fn advance(&mut self, byte: u8) -> Result<bool, Error> {
        match self.state {
            State::MethodStart => {
                if !is_token_byte(byte) {
                    return self.fail();
                }
                self.method_token.push(byte as char);
                self.state = State::Method;
            }
            State::Method => {
                if byte == b' ' {
                    self.request.method = Method::from_token(&self.method_token);
                    self.state = State::Uri;
                } else if !is_token_byte(byte) {
                    return self.fail();
                } else {
                    self.method_token.push(byte as char);
                }
            }
            State::Uri => {
                if byte == b' ' {
                    self.state = State::VersionH;
                } else if is_ctl(byte) {
                    return self.fail();
                } else {
                    self.request.uri.push(byte as char);
                }
            }
            State::VersionH => {
                if byte != b'H' {
                    return self.fail();
                }
                self.state = State::VersionT1;
            }
            State::VersionT1 => {
                if byte != b'T' {
                    return self.fail();
                }
                self.state = State::VersionT2;
            }
            State::VersionT2 => {
                if byte != b'T' {
                    return self.fail();
                }
                self.state = State::VersionP;
            }
            State::VersionP => {
                if byte != b'P' {
                    return self.fail();
                }
                self.state = State::VersionSlash;
            }
            State::VersionSlash => {
                if byte != b'/' {
                    return self.fail();
                }
                self.request.http_version_major = 0;
                self.request.http_version_minor = 0;
                self.state = State::VersionMajorStart;
            }
            State::VersionMajorStart => {
                if !byte.is_ascii_digit() {
                    return self.fail();
                }
                self.request.http_version_major = u32::from(byte - b'0');
                self.state = State::VersionMajor;
            }
            State::VersionMajor => {
                if byte == b'.' {
                    self.state = State::VersionMinorStart;
                } else if byte.is_ascii_digit() {
                    self.request.http_version_major =
                        self.request.http_version_major * 10 + u32::from(byte - b'0');
                } else {
                    return self.fail();
                }
            }
            State::VersionMinorStart => {
                if !byte.is_ascii_digit() {
                    return self.fail();
                }
                self.request.http_version_minor = u32::from(byte - b'0');
                self.state = State::VersionMinor;
            }
            State::VersionMinor => {
                if byte == b'\r' {
                    self.state = State::Newline1;
                } else if byte.is_ascii_digit() {
                    self.request.http_version_minor =
                        self.request.http_version_minor * 10 + u32::from(byte - b'0');
                } else {
                    return self.fail();
                }
            }
            State::Newline1 => {
                if byte != b'\n' {
                    return self.fail();
                }
                self.state = State::HeaderLineStart;
            }
            State::HeaderLineStart => {
                if byte == b'\r' {
                    self.state = State::Newline3;
                } else if (byte == b' ' || byte == b'\t') && !self.request.headers.is_empty() {
                    // obs-fold: the line continues the previous header's value
                    self.state = State::HeaderLws;
                } else if !is_token_byte(byte) {
                    return self.fail();
                } else {
                    self.request.headers.push(Header::new((byte as char).to_string(), ""));
                    self.state = State::HeaderName;
                }
            }
            State::HeaderLws => {
                if byte == b'\r' {
                    self.state = State::Newline2;
                } else if byte == b' ' || byte == b'\t' {
                    // skip leading whitespace of the folded line
                } else if is_ctl(byte) {
                    return self.fail();
                } else {
                    self.push_value_byte(byte);
                    self.state = State::HeaderValue;
                }
            }
            State::HeaderName => {
                if byte == b':' {
                    self.state = State::SpaceBeforeHeaderValue;
                } else if !is_token_byte(byte) {
                    return self.fail();
                } else if let Some(header) = self.request.headers.last_mut() {
                    header.name.push(byte as char);
                }
            }
            State::SpaceBeforeHeaderValue => {
                if byte != b' ' {
                    return self.fail();
                }
                self.state = State::HeaderValue;
            }
            State::HeaderValue => {
                if byte == b'\r' {
                    self.state = State::Newline2;
                } else if is_ctl(byte) {
                    return self.fail();
                } else {
                    self.push_value_byte(byte);
                }
            }
            State::Newline2 => {
                if byte != b'\n' {
                    return self.fail();
                }
                self.state = State::HeaderLineStart;
            }
            State::Newline3 => {
                if byte != b'\n' {
                    return self.fail();
                }
                self.state = State::Done;
                return Ok(true);
            }
            State::Done | State::Failed => return self.fail(),
        }
        Ok(false)
    }

    fn push_value_byte(&mut self, byte: u8) {
        if let Some(header) = self.request.headers.last_mut() {
            header.value.push(byte as char);
        }
    }
}

/// ASCII, not a control character, not a separator.
fn is_token_byte(byte: u8) -> bool {
    byte < 128 && !is_ctl(byte) && !is_special(byte)
}

fn is_ctl(byte: u8) -> bool {
    byte <= 31 || byte == 127
}

fn is_special(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')'
            | b'<'
            | b'>'
            | b'@'
            | b','
            | b';'
            | b':'
            | b'\\'
            | b'"'
            | b'/'
            | b'['
            | b']'
            | b'?'
            | b'='
            | b'{'
            | b'}'
            | b' '
            | b'\t'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEEP_ALIVE_GET: &[u8] = b"GET /hello.htm HTTP/1.1\r\n\
        User-Agent: Mozilla/4.0\r\n\
        Host: www.tutorialspoint.com\r\n\
        Accept-Language: en-us\r\n\
        Accept-Encoding: gzip\r\n\
        Accept-Encoding: deflate\r\n\
        Connection: Keep-Alive\r\n\r\n";

    fn parse_whole(bytes: &[u8]) -> Request {
        let mut parser = RequestParser::new();
        match parser.feed(bytes).unwrap() {
            FeedStatus::Complete { consumed } => assert_eq!(consumed, bytes.len()),
            FeedStatus::NeedMore => panic!("request should be complete"),
        }
        parser.take_request()
    }

    #[test]
    fn a_valid_request_fills_the_structure() {
        let request = parse_whole(KEEP_ALIVE_GET);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.uri, "/hello.htm");
        assert_eq!(request.http_version_major, 1);
        assert_eq!(request.http_version_minor, 1);
        assert_eq!(request.header_value("Accept-Language"), Some("en-us"));
        assert_eq!(request.header_values("Accept-Encoding").count(), 2);
        assert!(request.headers_contain("Accept-Encoding", "deflate"));
    }

    #[test]
    fn any_chunking_yields_the_same_request() {
        let whole = parse_whole(KEEP_ALIVE_GET);

        // byte by byte
        let mut parser = RequestParser::new();
        let mut completed = 0;
        for &byte in KEEP_ALIVE_GET {
            if let FeedStatus::Complete { consumed } = parser.feed(&[byte]).unwrap() {
                assert_eq!(consumed, 1);
                completed += 1;
            }
        }
        assert_eq!(completed, 1, "exactly one completion");
        let byte_by_byte = parser.take_request();
        assert_eq!(byte_by_byte.method, whole.method);
        assert_eq!(byte_by_byte.uri, whole.uri);
        assert_eq!(byte_by_byte.headers, whole.headers);

        // every split point
        for split in 1..KEEP_ALIVE_GET.len() {
            let mut parser = RequestParser::new();
            assert_eq!(parser.feed(&KEEP_ALIVE_GET[..split]).unwrap(), FeedStatus::NeedMore);
            match parser.feed(&KEEP_ALIVE_GET[split..]).unwrap() {
                FeedStatus::Complete { consumed } => {
                    assert_eq!(consumed, KEEP_ALIVE_GET.len() - split);
                }
                FeedStatus::NeedMore => panic!("split at {split} never completed"),
            }
            assert_eq!(parser.take_request().headers, whole.headers);
        }
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let mut input = KEEP_ALIVE_GET.to_vec();
        input.extend_from_slice(&[0x82, 0x02, 0x00, 0x00]);
        let mut parser = RequestParser::new();
        match parser.feed(&input).unwrap() {
            FeedStatus::Complete { consumed } => assert_eq!(consumed, KEEP_ALIVE_GET.len()),
            FeedStatus::NeedMore => panic!("request should be complete"),
        }
    }

    #[test]
    fn a_space_in_the_header_name_is_rejected() {
        let input = b"GET /hello.htm HTTP/1.1\r\nUser - Agent: Mozilla/4.0\r\n\r\n";
        let mut parser = RequestParser::new();
        assert!(matches!(parser.feed(input), Err(Error::BadRequest)));
        // the parser stays poisoned until reset
        assert!(parser.feed(b"GET / HTTP/1.1\r\n\r\n").is_err());
        parser.reset();
        assert!(matches!(
            parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap(),
            FeedStatus::Complete { .. }
        ));
    }

    #[test]
    fn an_empty_request_target_is_rejected() {
        // "HEAD HTTP/1.1" — the uri state sees the space before any byte,
        // leaving "HTTP/1.1" to be read as the version, which then breaks.
        let input = b"HEAD HTTP/1.1\r\nHost: x\r\n\r\n";
        let mut parser = RequestParser::new();
        assert!(parser.feed(input).is_err());
    }

    #[test]
    fn unknown_methods_complete_as_undefined() {
        let request = parse_whole(b"BREW /pot HTTP/1.1\r\n\r\n");
        assert_eq!(request.method, Method::Undefined);
    }

    #[test]
    fn folded_header_lines_extend_the_previous_value() {
        let request = parse_whole(b"GET / HTTP/1.1\r\nX-Long: first\r\n  second\r\n\r\n");
        assert_eq!(request.header_value("X-Long"), Some("firstsecond"));
    }

    #[test]
    fn a_folded_line_before_any_header_is_rejected() {
        let mut parser = RequestParser::new();
        assert!(parser.feed(b"GET / HTTP/1.1\r\n  oops\r\n\r\n").is_err());
    }

    #[test]
    fn control_bytes_in_the_uri_are_rejected() {
        let mut parser = RequestParser::new();
        assert!(parser.feed(b"GET /he\x01llo HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn multi_digit_versions_accumulate() {
        let request = parse_whole(b"GET / HTTP/12.34\r\n\r\n");
        assert_eq!(request.http_version_major, 12);
        assert_eq!(request.http_version_minor, 34);
    }
}
