//! Error types for the transport and listener layers.
//!
//! Protocol malformation and missing resources are not errors here: they are
//! folded into `Method::Unknown` and 403/404 responses by the HTTP layer.

use std::io;
use std::path::PathBuf;

/// Failures of a connected transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport was shut down (or never connected); no I/O was attempted.
    #[error("transport is not connected")]
    NotConnected,

    #[error("socket I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open '{path}': {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of the listening socket.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("listener is not bound")]
    NotBound,

    #[error("listener is not listening")]
    NotListening,

    #[error("listener I/O failed: {0}")]
    Io(#[from] io::Error),
}
