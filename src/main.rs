//! Web addresses site server.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                      SITE                         │
//!   Request        │  ┌────────┐   ┌──────────┐   ┌────────────────┐  │
//!   ───────────────┼─▶│  http  │──▶│ routing  │──▶│ query (parse,  │  │
//!                  │  │ server │   │ rewrite  │   │ filters, main) │  │
//!                  │  └────────┘   └──────────┘   └───────┬────────┘  │
//!                  │                                       ▼           │
//!   Response       │  ┌────────┐   ┌──────────┐   ┌────────────────┐  │
//!   ◀──────────────┼──│response│◀──│ template │◀──│ content store  │  │
//!                  │  └────────┘   │  hooks   │   └────────────────┘  │
//!                  │               └──────────┘                       │
//!                  │  plugins (clients) subscribe via hooks at startup │
//!                  └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use web_addresses::config::{load_config, SiteConfig};
use web_addresses::http::HttpServer;
use web_addresses::lifecycle::{self, signals, Shutdown};
use web_addresses::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "web-addresses", version, about = "Rewrite-driven site server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SiteConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "web-addresses starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        admin = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let started = lifecycle::start(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, started.site.clone());
    server.run(listener, shutdown.subscribe()).await?;

    drop(started.watcher);
    tracing::info!("Shutdown complete");
    Ok(())
}
