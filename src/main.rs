//! WebShield server (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  WEBSHIELD                   │
//!                      │                                              │
//!   Client Request     │  ┌──────────┐   ┌────────────┐   ┌────────┐  │
//!   ───────────────────┼─▶│   http   │──▶│ rate limit │──▶│handler │  │
//!                      │  │  server  │   │ (security) │   └───┬────┘  │
//!                      │  └──────────┘   └────────────┘       │       │
//!                      │                                      ▼       │
//!                      │            ┌─────────┐        ┌────────────┐ │
//!   Client Response    │            │settings │───────▶│  scanner   │ │
//!   ◀──────────────────┼────────────┤snapshot │        │ classify + │ │
//!                      │            └─────────┘        │  combine   │ │
//!                      │                               └─────┬──────┘ │
//!                      │                                     ▼        │
//!                      │                        ┌──────────────────┐  │
//!   /ws/logs ◀─────────┼────────────────────────│ audit (sink +    │  │
//!                      │                        │ live broadcast)  │  │
//!                      │                        └──────────────────┘  │
//!                      │  ┌────────────────────────────────────────┐  │
//!                      │  │ config · observability · lifecycle     │  │
//!                      │  └────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use webshield::config::{load_config, WebShieldConfig};
use webshield::lifecycle::{wait_for_signal, Shutdown};
use webshield::observability::{init_logging, init_metrics};
use webshield::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "webshield", version)]
#[command(about = "Inline payload scanner with per-client rate limiting", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "WEBSHIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => WebShieldConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind.to_string();
    }

    init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webshield starting");
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        sensitivity = %config.scanner.sensitivity,
        safe_mode = config.scanner.safe_mode,
        rate_limiting = config.rate_limit.enabled,
        audit_backend = ?config.audit.backend,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let server = HttpServer::new(&config)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                trigger.trigger();
            }
            Err(err) => tracing::error!(error = %err, "Failed to install signal handlers"),
        }
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
