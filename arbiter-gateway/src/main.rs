//! Arbiter gateway binary: loads configuration, initializes tracing, and
//! serves the routing core over HTTP until interrupted.

use clap::Parser;
use std::net::SocketAddr;

use arbiter_gateway::config::Config;
use arbiter_gateway::server::create_server;

/// Command line arguments for the Arbiter gateway server.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Host address override. Defaults to the configured host.
    #[arg(long)]
    host: Option<String>,

    /// Port override. Defaults to the configured port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Logging filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .init();

    let config = Config::load(&args.config)?;
    config.validate()?;

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let app = create_server(config).await?;

    let addr = SocketAddr::new(host.parse()?, port);
    tracing::info!("starting arbiter gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process receives ctrl-c, letting in-flight requests
/// drain and connection-owning collaborators release their resources.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
