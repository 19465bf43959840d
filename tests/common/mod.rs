//! Shared utilities for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tinyhttpd::error::TransportError;
use tinyhttpd::server::transport::{RecvEvent, Transport};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// What the mock does with one call to `send`.
#[derive(Debug, Clone, Copy)]
pub enum SendStep {
    /// Accept at most this many bytes.
    Accept(usize),
    /// Accept nothing (congested send queue).
    Congested,
    /// Fail the call.
    Fail,
}

/// In-memory transport with scripted input and scripted send results.
///
/// Once `incoming` is drained, readiness waits time out unless `peer_closed`
/// is set, in which case they report readable and `recv` returns 0.
/// Sends beyond the script accept everything.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub incoming: VecDeque<u8>,
    pub peer_closed: bool,
    pub send_plan: VecDeque<SendStep>,
    pub sent: Vec<u8>,
    pub send_calls: usize,
    pub shut_down: bool,
}

impl MockTransport {
    /// Peer sends `bytes` then goes quiet.
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            incoming: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Peer sends `bytes` then closes its side.
    pub fn closing_after(bytes: &[u8]) -> Self {
        Self {
            peer_closed: true,
            ..Self::with_input(bytes)
        }
    }

    pub fn plan(mut self, steps: impl IntoIterator<Item = SendStep>) -> Self {
        self.send_plan.extend(steps);
        self
    }

    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl Transport for MockTransport {
    fn is_valid(&self) -> bool {
        !self.shut_down
    }

    async fn wait_for_readable(&mut self, _timeout: Duration) -> RecvEvent {
        if !self.incoming.is_empty() || self.peer_closed {
            RecvEvent::Readable
        } else {
            RecvEvent::TimedOut
        }
    }

    async fn send(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        if self.shut_down {
            return Err(TransportError::NotConnected);
        }
        self.send_calls += 1;

        match self.send_plan.pop_front() {
            None => {
                self.sent.extend_from_slice(buf);
                Ok(buf.len())
            }
            Some(SendStep::Accept(n)) => {
                let n = n.min(buf.len());
                self.sent.extend_from_slice(&buf[..n]);
                Ok(n)
            }
            Some(SendStep::Congested) => Ok(0),
            Some(SendStep::Fail) => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted send failure",
            ))),
        }
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.shut_down {
            return Err(TransportError::NotConnected);
        }

        let n = buf.len().min(self.incoming.len());
        for slot in buf.iter_mut().take(n) {
            if let Some(byte) = self.incoming.pop_front() {
                *slot = byte;
            }
        }
        Ok(n)
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        if self.shut_down {
            return Err(TransportError::NotConnected);
        }
        self.shut_down = true;
        Ok(())
    }
}

/// A throwaway web root under the system temp directory, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(tag: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tinyhttpd-{tag}-{}-{n}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// The root as the plain string prefix the server concatenates URIs onto.
    pub fn root(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Reads one response: the head up to the blank line, then `Content-Length`
/// bytes of body.
pub async fn read_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).await.unwrap();
        assert!(n > 0, "connection closed inside response head");
        head.push(byte[0]);
    }
    let head = String::from_utf8(head).unwrap();

    let len = header_value(&head, "Content-Length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await.unwrap();

    (head, body)
}

/// Value of the first header named `name` in a formatted head.
pub fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(": "))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
