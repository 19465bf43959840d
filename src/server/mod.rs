//! The accept loop and the listening/transport sockets beneath it.

pub mod listener;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::http::connection::{Connection, ServeContext};
use listener::{Acceptor, Listener};

/// Pause before retrying after a failed accept.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Owns the listening socket and the settings handed to every connection.
pub struct Server {
    listener: Listener,
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            listener: Listener::new(),
            config,
        }
    }

    /// Binds to `port` on the configured address (all interfaces by default).
    pub fn bind(&mut self, port: u16) -> anyhow::Result<()> {
        let address = self.config.bind_address.clone();
        self.bind_addr(&address, port)
    }

    pub fn bind_addr(&mut self, address: &str, port: u16) -> anyhow::Result<()> {
        self.listener
            .bind(address, port)
            .with_context(|| format!("binding server port {port}"))?;
        self.config.port = port;
        Ok(())
    }

    pub fn listen(&mut self, backlog: u32) -> anyhow::Result<()> {
        self.listener
            .listen(backlog)
            .context("setting listening mode")?;
        self.config.backlog = backlog;
        Ok(())
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn set_web_root(&mut self, web_root: impl Into<String>) {
        self.config.web_root = web_root.into();
    }

    pub fn web_root(&self) -> &str {
        &self.config.web_root
    }

    /// Turns the per-request/response dumps on or off.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accepts connections forever, spawning one independent task per
    /// connection. See [`accept_loop`].
    ///
    /// Only calling this before [`Server::listen`] returns an error.
    pub async fn run(self) -> anyhow::Result<()> {
        if !self.listener.is_listening() {
            anyhow::bail!("server is not listening");
        }

        let ctx = Arc::new(ServeContext::from_config(&self.config));

        info!(
            port = self.config.port,
            web_root = %ctx.web_root,
            "accepting connections"
        );

        accept_loop(self.listener, ctx).await;
        Ok(())
    }
}

/// Takes connections from `acceptor` forever and serves each one on its own
/// task.
///
/// A failed accept is logged and retried after [`ACCEPT_RETRY_DELAY`]; it
/// never ends the loop. Spawned tasks are neither tracked nor capped.
pub async fn accept_loop<A: Acceptor>(mut acceptor: A, ctx: Arc<ServeContext>) {
    let mut next_id: u64 = 0;

    loop {
        let (conn, peer) = match acceptor.next_connection().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed, retrying");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        next_id += 1;
        let span = info_span!("connection", id = next_id, %peer);
        let ctx = Arc::clone(&ctx);
        tokio::spawn(
            async move {
                Connection::new(conn, ctx).run().await;
            }
            .instrument(span),
        );
    }
}
