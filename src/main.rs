//! NBKR CORS Proxy
//!
//! Relays GET requests to the National Bank of the Kyrgyz Republic XML feeds
//! (or any allow-listed upstream) and adds the CORS headers the upstream omits.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │                 CORS PROXY                   │
//!   Browser         │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ────────────────┼─▶│ request  │──▶│  cors    │──▶│ handlers │  │
//!                   │  │ id/trace │   │middleware│   └────┬─────┘  │
//!                   │  └──────────┘   └──────────┘        │        │
//!                   │                                     ▼        │
//!                   │                ┌──────────┐   ┌──────────┐   │
//!                   │                │allow-list│◀──│  proxy   │   │
//!                   │                │ (policy) │   │ service  │   │
//!                   │                └──────────┘   └────┬─────┘   │
//!                   │                                    ▼         │
//!   ◀───────────────┼──────── relayed status/body ◀─ forwarder ────┼──▶ Upstream
//!                   └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use nbkr_cors_proxy::lifecycle::{startup, Shutdown};
use nbkr_cors_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "nbkr-cors-proxy", version, about = "CORS proxy for the NBKR XML API", long_about = None)]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener host
    #[arg(long)]
    host: Option<String>,

    /// Override listener port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = startup::load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.listener.host = host;
    }
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("nbkr-cors-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        timeout_secs = config.upstream.timeout_secs,
        aliases = config.aliases.len(),
        "Configuration loaded"
    );

    let (server, listener) = startup::start(config).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
