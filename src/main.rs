//! authgateway
//!
//! An authenticating HTTP gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   AUTH GATEWAY                    │
//!   Client Request        │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ──────────────────────┼─▶│  http  │──▶│   auth   │──▶│    routing    │   │
//!                         │  │ server │   │ (bearer) │   │  RouteCache   │   │
//!                         │  └────────┘   └──────────┘   └───────┬───────┘   │
//!                         │                                      ▼           │
//!   Client Response       │  ┌──────────┐   ┌──────────────────────────┐     │
//!   ◀─────────────────────┼──│ security │◀──│ reqwest forward + creds  │◀────┼── Backend
//!                         │  │ headers  │   └──────────────────────────┘     │
//!                         │  └──────────┘                                    │
//!                         │  ┌────────────────────────────────────────────┐  │
//!                         │  │ refresh (checkpoints) → source (property   │  │
//!                         │  │ store) → RouteCache    admin (ping, reset) │  │
//!                         │  └────────────────────────────────────────────┘  │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use authgateway::config::load_config;
use authgateway::http::GatewayServer;
use authgateway::lifecycle::{build_scheduler, build_source, build_state, signals, Shutdown};
use authgateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "authgateway")]
#[command(about = "Authenticating HTTP gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "AUTHGATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment.name,
        bind_address = %config.listener.bind_address,
        "authgateway starting"
    );

    let source = build_source(&config.config_source)?;
    let state = build_state(&config, source);
    let scheduler = build_scheduler(&config, state.cache.clone())?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Startup reset completes before the listener accepts traffic.
    let scheduler = scheduler.start().await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_stop = shutdown.signalled();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    let served = GatewayServer::new(state).run(listener, server_stop).await;

    scheduler.stop().await;
    served?;

    tracing::info!("Shutdown complete");
    Ok(())
}
