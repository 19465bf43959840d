use std::future::Future;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::{TcpListener, TcpSocket};
use tracing::debug;

use crate::error::ListenerError;
use crate::server::transport::{TcpConnection, Transport};

/// A source of accepted connections for the accept loop.
pub trait Acceptor: Send {
    type Conn: Transport + 'static;

    /// Waits for the next connection and returns it with the peer address.
    fn next_connection(&mut self) -> impl Future<Output = Result<(Self::Conn, SocketAddr), ListenerError>> + Send;
}

enum ListenerState {
    Unbound,
    Bound(TcpSocket),
    Listening(TcpListener),
}

/// A TCP listening socket that moves through `bind` then `listen`, and hands out
/// one accepted connection at a time.
pub struct Listener {
    state: ListenerState,
    backlog: u32,
}

impl Listener {
    pub fn new() -> Self {
        Self {
            state: ListenerState::Unbound,
            backlog: 0,
        }
    }

    /// Binds to `address:port`. An empty address binds every IPv4 interface.
    pub fn bind(&mut self, address: &str, port: u16) -> Result<(), ListenerError> {
        let ip = if address.is_empty() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            address.parse::<IpAddr>().map_err(|e| {
                ListenerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
            })?
        };
        let addr = SocketAddr::new(ip, port);

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;

        debug!(%addr, "listener bound");
        self.state = ListenerState::Bound(socket);
        Ok(())
    }

    /// Turns a bound socket into a listening one with the given queue length.
    ///
    /// A failed `listen` consumes the bound socket: the listener is left
    /// unbound and must be bound again before retrying.
    pub fn listen(&mut self, backlog: u32) -> Result<(), ListenerError> {
        match mem::replace(&mut self.state, ListenerState::Unbound) {
            ListenerState::Bound(socket) => {
                let listener = socket.listen(backlog).inspect_err(|e| {
                    debug!(error = %e, "listen failed, listener is unbound");
                })?;
                self.backlog = backlog;
                self.state = ListenerState::Listening(listener);
                Ok(())
            }
            listening @ ListenerState::Listening(_) => {
                self.state = listening;
                Ok(())
            }
            ListenerState::Unbound => Err(ListenerError::NotBound),
        }
    }

    /// Waits for the next peer and returns its connection with both endpoints
    /// resolved.
    ///
    /// Errors are soft from the server's point of view: the accept loop backs off
    /// and tries again.
    pub async fn accept(&self) -> Result<TcpConnection, ListenerError> {
        let ListenerState::Listening(listener) = &self.state else {
            return Err(ListenerError::NotListening);
        };

        let (stream, remote) = listener.accept().await?;
        let local = stream.local_addr()?;

        Ok(TcpConnection::new(stream, local, remote))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        match &self.state {
            ListenerState::Unbound => Err(ListenerError::NotBound),
            ListenerState::Bound(socket) => Ok(socket.local_addr()?),
            ListenerState::Listening(listener) => Ok(listener.local_addr()?),
        }
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self.state, ListenerState::Unbound)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, ListenerState::Listening(_))
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }
}

impl Acceptor for Listener {
    type Conn = TcpConnection;

    async fn next_connection(&mut self) -> Result<(TcpConnection, SocketAddr), ListenerError> {
        let conn = self.accept().await?;
        let peer = conn.peer_addr();
        debug!(%peer, local = %conn.local_addr(), "accepted connection");
        Ok((conn, peer))
    }
}

impl Default for Listener {
    fn default() -> Self {
        Self::new()
    }
}
