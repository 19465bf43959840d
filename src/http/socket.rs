use std::path::Path;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::parser::{parse_head, HeadScanner};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::transport::{send_file, RecvEvent, Transport};

/// One HTTP exchange over a borrowed transport.
///
/// Tracks whether the connection is still up: a readiness timeout, a receive
/// error, the peer closing, or a failed send all flip it down for good.
pub struct HttpSocket<'a, T: Transport> {
    transport: &'a mut T,
    timeout: Duration,
    index: &'a str,
    up: bool,
}

impl<'a, T: Transport> HttpSocket<'a, T> {
    /// `timeout` bounds the wait before every byte of the request head;
    /// `index` replaces a bare `/` URI.
    pub fn new(transport: &'a mut T, timeout: Duration, index: &'a str) -> Self {
        Self {
            transport,
            timeout,
            index,
            up: true,
        }
    }

    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Reads one request head and parses it.
    ///
    /// If the connection goes down before the blank line, the returned request
    /// holds only the lines seen so far and an `UNKNOWN` method; check
    /// [`HttpSocket::is_up`] before using it.
    pub async fn receive(&mut self) -> Request {
        let mut scanner = HeadScanner::new();
        let mut byte = [0u8; 1];

        while self.up && self.transport.is_valid() {
            match self.transport.wait_for_readable(self.timeout).await {
                RecvEvent::Readable => {}
                RecvEvent::TimedOut | RecvEvent::Error => {
                    self.up = false;
                    break;
                }
            }

            match self.transport.recv(&mut byte).await {
                Ok(0) | Err(_) => {
                    self.up = false;
                    break;
                }
                Ok(_) => {}
            }

            if scanner.push(byte[0]) {
                break;
            }
        }

        if !self.transport.is_valid() {
            self.up = false;
        }

        if !self.up {
            return Request::from_headers(scanner.into_headers());
        }

        parse_head(scanner.into_headers(), self.index)
    }

    /// Sends the formatted response head. Returns whether the connection is
    /// still up afterwards.
    pub async fn send(&mut self, response: &Response) -> bool {
        if self.up && !ResponseWriter::new(response.head()).write_to(&mut *self.transport).await {
            self.up = false;
        }
        self.up
    }

    /// Streams a file after the head. See [`send_file`].
    pub async fn send_file(&mut self, path: &Path) -> Result<u64, TransportError> {
        send_file(&mut *self.transport, path).await
    }
}
