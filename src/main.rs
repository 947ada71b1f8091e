// XMRig Bridge - Free and Open Source Software Statement
//
// File: src/main.rs
// Version: 1.1.0
//
// Entry point for the XMRig Bridge: expose a local stratum port to miners
// while an upstream task keeps the authenticated relay WebSocket alive.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber;

use xmrig_bridge::core::types::Args;
use xmrig_bridge::status::{StatusReporter, TEMP_STOP, TEMP_THROTTLE};
use xmrig_bridge::upstream::client::run_keepalive;
use xmrig_bridge::utils::get_or_create_client_id;
use xmrig_bridge::{BridgeState, Result, StratumServer, UpstreamClient};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    tracing_subscriber::fmt::init();

    let client_id = get_or_create_client_id(&args.client_id_file)?;

    info!("🚀 Starting XMRig Bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("📍 Relay: {}", args.relay);
    info!("🆔 Client ID: {}", client_id);
    info!("🌡️ Temperature thresholds: throttle {}°C, stop {}°C", TEMP_THROTTLE, TEMP_STOP);

    let state = Arc::new(BridgeState::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Local stratum listener
    let server = StratumServer::bind(&format!("{}:{}", args.bind, args.port)).await?;
    info!("⛏️ Point your XMRig to: stratum+tcp://{}", server.local_addr()?);
    let server_task = tokio::spawn(server.run(Arc::clone(&state), shutdown_rx.clone()));

    // Relay connection lifecycle
    let upstream = UpstreamClient::new(
        &args.relay,
        &client_id,
        Duration::from_secs(args.reconnect_delay),
        args.drain_on_kick,
        Arc::clone(&state),
        shutdown_rx.clone(),
    );
    let upstream_task = tokio::spawn(upstream.run());

    // Keepalive ping and periodic status
    tokio::spawn(run_keepalive(
        Arc::clone(&state),
        Duration::from_secs(args.ping_interval),
        shutdown_rx.clone(),
    ));
    let reporter = StatusReporter::new(
        Arc::clone(&state),
        Duration::from_secs(args.status_interval),
        shutdown_rx.clone(),
    );
    tokio::spawn(reporter.run());

    tokio::signal::ctrl_c().await?;
    info!("👋 Shutting down...");
    let _ = shutdown_tx.send(true);

    let _ = server_task.await;
    let _ = upstream_task.await;
    Ok(())
}

// Changelog:
// - v1.1.0 (2025-07-30): Cooperative shutdown via a watch channel.
// - v1.0.0 (2025-07-12): Initial entry point.
