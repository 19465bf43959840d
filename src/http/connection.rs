use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::http::mime::MimeTable;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::socket::HttpSocket;
use crate::server::transport::Transport;

/// Immutable settings shared by every connection task.
#[derive(Debug, Clone)]
pub struct ServeContext {
    pub web_root: String,
    pub index: String,
    pub mime: MimeTable,
    /// Bound on the wait before each byte of a request head.
    pub timeout: Duration,
    /// Dump every request and response head to the log.
    pub verbose: bool,
}

impl ServeContext {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            web_root: cfg.web_root.clone(),
            index: cfg.index.clone(),
            mime: cfg.mime_table(),
            timeout: cfg.connection_timeout(),
            verbose: cfg.verbose,
        }
    }
}

pub enum ConnectionState {
    Serving,
    Responding(Request),
    Terminated,
}

/// Serves requests on one accepted connection until it goes down.
pub struct Connection<T: Transport> {
    transport: T,
    ctx: Arc<ServeContext>,
    state: ConnectionState,
    served: usize,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, ctx: Arc<ServeContext>) -> Self {
        Self {
            transport,
            ctx,
            state: ConnectionState::Serving,
            served: 0,
        }
    }

    /// Runs the receive/respond loop, then shuts the transport down in both
    /// directions whatever the reason for stopping.
    ///
    /// The loop ends when receiving a request finds the connection down, when
    /// sending a head fails, or when streaming a file fails. Error responses
    /// (403/404) never stream anything and keep the connection going.
    ///
    /// Returns the number of requests answered.
    pub async fn run(&mut self) -> usize {
        if self.ctx.verbose {
            info!("connection task started");
        }

        loop {
            match mem::replace(&mut self.state, ConnectionState::Terminated) {
                ConnectionState::Serving => {
                    let mut http = HttpSocket::new(&mut self.transport, self.ctx.timeout, &self.ctx.index);
                    let request = http.receive().await;

                    if http.is_up() {
                        self.state = ConnectionState::Responding(request);
                    }
                }

                ConnectionState::Responding(request) => {
                    if self.respond(&request).await {
                        self.served += 1;
                        self.state = ConnectionState::Serving;
                    }
                }

                ConnectionState::Terminated => {
                    break;
                }
            }
        }

        if let Err(e) = self.transport.shutdown().await {
            tracing::debug!(error = %e, "shutdown after serving failed");
        }

        if self.ctx.verbose {
            info!(served = self.served, "connection task finished");
        }

        self.served
    }

    /// Sends the response head and, when there is a file behind it and the
    /// method is not HEAD, the file. Returns `false` when the connection must
    /// terminate.
    async fn respond(&mut self, request: &Request) -> bool {
        let ctx = Arc::clone(&self.ctx);

        if ctx.verbose {
            info!(">>> REQUEST\n{request}");
        }

        let response = Response::for_request(request, &ctx.web_root, &ctx.mime).await;

        let mut http = HttpSocket::new(&mut self.transport, ctx.timeout, &ctx.index);
        if !http.send(&response).await {
            return false;
        }

        if request.method() != Method::HEAD {
            if let Some(path) = response.servable_path() {
                if let Err(e) = http.send_file(path).await {
                    warn!(path = %path.display(), error = %e, "error sending file");
                    return false;
                }
            }
        }

        if ctx.verbose {
            info!("<<< RESPONSE\n{response}");
        }

        true
    }

    pub fn served(&self) -> usize {
        self.served
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
