use std::path::PathBuf;

use clap::Parser;
use tinyhttpd::config::Config;
use tinyhttpd::server::Server;
use tracing_subscriber::EnvFilter;

/// Minimal static-file HTTP server
#[derive(Debug, Parser)]
#[command(name = "tinyhttpd", version, about)]
struct Cli {
    /// Bind server to a TCP port number
    #[arg(short, long)]
    port: Option<u16>,

    /// Local directory the request URIs are resolved under
    #[arg(short, long)]
    webroot: Option<String>,

    /// Log every request and response head
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Length of the pending-connection queue
    #[arg(short, long)]
    backlog: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::load_from(Some(path.as_path()))?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        cfg.port = port;
    }
    if let Some(webroot) = cli.webroot {
        cfg.web_root = webroot;
    }
    if let Some(backlog) = cli.backlog {
        cfg.backlog = backlog;
    }
    cfg.verbose |= cli.verbose;

    let default_level = if cfg.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut server = Server::new(cfg);
    server.bind(server.config().port)?;
    server.listen(server.config().backlog)?;

    tracing::info!(
        port = server.config().port,
        web_root = server.web_root(),
        "TinyHttpServer is listening"
    );

    tokio::select! {
        res = server.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
