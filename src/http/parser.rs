//! Request head scanning and request-line parsing.
//!
//! The head is consumed one byte at a time so that the caller can interleave a
//! readiness wait (and its timeout) before every byte. [`HeadScanner`] tracks
//! the `CRLF CRLF` terminator with [`CrlfState`] and splits the bytes into raw
//! lines; [`parse_head`] then turns the collected lines into a [`Request`].

use bytes::BytesMut;

use crate::http::request::{Method, Request, Version};

/// Progress through the `\r\n\r\n` sequence that closes a request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrlfState {
    #[default]
    Idle,
    Cr1,
    Lf1,
    Cr2,
    Lf2,
}

impl CrlfState {
    /// Feeds one byte. Any byte that does not continue the sequence resets to
    /// `Idle`; `Lf2` is terminal.
    pub fn advance(self, byte: u8) -> Self {
        match (self, byte) {
            (CrlfState::Idle, b'\r') => CrlfState::Cr1,
            (CrlfState::Cr1, b'\n') => CrlfState::Lf1,
            (CrlfState::Lf1, b'\r') => CrlfState::Cr2,
            (CrlfState::Cr2, b'\n') => CrlfState::Lf2,
            (CrlfState::Lf2, _) => CrlfState::Lf2,
            _ => CrlfState::Idle,
        }
    }

    pub fn is_complete(self) -> bool {
        self == CrlfState::Lf2
    }
}

/// Accumulates a request head byte by byte.
#[derive(Debug, Default)]
pub struct HeadScanner {
    state: CrlfState,
    line: BytesMut,
    headers: Vec<String>,
}

impl HeadScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte and returns `true` once the blank line closing the head
    /// has been seen.
    ///
    /// Every time a single CRLF closes a non-empty line, that line (without
    /// its terminator) is committed as a header entry.
    pub fn push(&mut self, byte: u8) -> bool {
        self.line.extend_from_slice(&[byte]);
        self.state = self.state.advance(byte);

        match self.state {
            CrlfState::Lf2 => true,
            CrlfState::Lf1 => {
                let line = self.line.split();
                let line = line.strip_suffix(b"\r\n").unwrap_or(&line[..]);
                if !line.is_empty() {
                    self.headers.push(String::from_utf8_lossy(line).into_owned());
                }
                false
            }
            _ => false,
        }
    }

    pub fn state(&self) -> CrlfState {
        self.state
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn into_headers(self) -> Vec<String> {
        self.headers
    }
}

/// Rewrites `/` to the index file name; every other URI is kept verbatim.
///
/// No normalization, percent-decoding or traversal check happens here.
pub fn parse_uri(uri: &str, index: &str) -> String {
    if uri == "/" {
        index.to_string()
    } else {
        uri.to_string()
    }
}

/// Builds a [`Request`] from raw head lines.
///
/// The first line is split on single spaces; unless that yields exactly three
/// tokens (method, URI, version) the request keeps an `UNKNOWN` method.
pub fn parse_head(headers: Vec<String>, index: &str) -> Request {
    let mut request = Request::from_headers(headers);

    let Some(line) = request.request_line() else {
        return request;
    };

    let tokens: Vec<&str> = line.split(' ').collect();
    let [method, uri, version] = tokens.as_slice() else {
        return request;
    };

    let method = Method::parse(method);
    let uri = parse_uri(uri, index);
    let version = Version::parse(version);

    request.set_request_line(method, uri, version);
    request
}
