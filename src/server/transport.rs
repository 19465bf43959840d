//! Byte-level transport over a connected socket.
//!
//! `Transport` is the seam between the HTTP layer and the network: the request
//! parser, the header writer and [`send_file`] only ever talk to it, so they
//! can be driven by an in-memory transport as easily as by a `TcpStream`.

use std::future::Future;
use std::net::{Shutdown, SocketAddr};
use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::TransportError;

/// Size of the chunks read from disk and pushed through [`Transport::send`].
pub const TX_BUFFER_SIZE: usize = 0x10_0000;

/// Pause applied when a send accepts zero bytes.
pub const CONGESTION_BACKOFF: Duration = Duration::from_secs(1);

/// Outcome of a bounded wait for read-readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvEvent {
    /// Data is available, or the peer closed (the next receive returns 0).
    Readable,
    /// Nothing arrived before the timeout expired.
    TimedOut,
    /// The wait itself failed.
    Error,
}

/// A connected, bidirectional byte stream.
///
/// Implementors own their descriptor; once invalid (e.g. after
/// [`Transport::shutdown`]) every operation fails with
/// [`TransportError::NotConnected`] without touching the OS.
pub trait Transport: Send {
    /// Returns `true` while the underlying descriptor is usable.
    fn is_valid(&self) -> bool;

    /// Waits up to `timeout` for the transport to become readable.
    ///
    /// A zero timeout polls once without waiting.
    fn wait_for_readable(&mut self, timeout: Duration) -> impl Future<Output = RecvEvent> + Send;

    /// Sends from `buf`, returning how many bytes were accepted.
    ///
    /// This may be fewer than `buf.len()` (or zero under congestion); callers loop.
    fn send(&mut self, buf: &[u8]) -> impl Future<Output = Result<usize, TransportError>> + Send;

    /// Receives into `buf`. `Ok(0)` means the peer closed the connection.
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, TransportError>> + Send;

    /// Shuts both directions down and invalidates the transport.
    fn shutdown(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// An accepted TCP connection with the endpoints resolved at accept time.
#[derive(Debug)]
pub struct TcpConnection {
    stream: Option<TcpStream>,
    local: SocketAddr,
    remote: SocketAddr,
}

impl TcpConnection {
    pub fn new(stream: TcpStream, local: SocketAddr, remote: SocketAddr) -> Self {
        Self {
            stream: Some(stream),
            local,
            remote,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.remote
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for TcpConnection {
    fn is_valid(&self) -> bool {
        self.stream.is_some()
    }

    async fn wait_for_readable(&mut self, timeout: Duration) -> RecvEvent {
        let Some(stream) = self.stream.as_ref() else {
            return RecvEvent::Error;
        };

        // `readable()` may still carry readiness from the previous read; a peek
        // only completes once a byte or EOF is pending.
        let mut probe = [0u8; 1];
        match tokio::time::timeout(timeout, stream.peek(&mut probe)).await {
            Ok(Ok(_)) => RecvEvent::Readable,
            Ok(Err(e)) => {
                tracing::debug!(peer = %self.remote, error = %e, "readiness wait failed");
                RecvEvent::Error
            }
            Err(_) => RecvEvent::TimedOut,
        }
    }

    async fn send(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        let stream = self.stream_mut()?;
        Ok(stream.write(buf).await?)
    }

    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let stream = self.stream_mut()?;
        Ok(stream.read(buf).await?)
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        let stream = self.stream.take().ok_or(TransportError::NotConnected)?;

        // tokio only exposes a write-side shutdown; go through std for both halves.
        let stream = stream.into_std()?;
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer may already have torn the connection down.
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Streams the file at `path` through `transport`.
///
/// The file is read in [`TX_BUFFER_SIZE`] chunks. Every chunk is pushed until
/// fully accepted: partial sends resume where they stopped, and a send that
/// accepts zero bytes is treated as congestion and retried after
/// [`CONGESTION_BACKOFF`], with no bound on the number of retries. A failed send
/// aborts the whole transfer.
///
/// Returns the total number of bytes sent.
pub async fn send_file<T: Transport>(transport: &mut T, path: &Path) -> Result<u64, TransportError> {
    let mut file = File::open(path)
        .await
        .map_err(|source| TransportError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let mut chunk = vec![0u8; TX_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let size = file
            .read(&mut chunk)
            .await
            .map_err(|source| TransportError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        if size == 0 {
            break;
        }

        let mut sent = 0;
        while sent < size {
            let n = transport.send(&chunk[sent..size]).await?;

            if n == 0 {
                tracing::debug!(path = %path.display(), "send queue congested, backing off");
                tokio::time::sleep(CONGESTION_BACKOFF).await;
                continue;
            }

            sent += n;
        }

        total += size as u64;
    }

    Ok(total)
}
