// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/upstream/client.rs
// Version: 1.3.0
//
// This file implements the relay connection lifecycle for the XMRig Bridge,
// located in the upstream subdirectory. It connects, authenticates, receives
// jobs and commands, drains the pending share queue after authentication,
// and reconnects forever with a fixed delay. Local miners are unaffected by
// anything that happens here.
//
// Tree Location:
// - src/upstream/client.rs (relay connect/receive loop and keepalive)
// - Depends on: tokio, tokio-tungstenite, futures-util, serde_json, crate::bridge

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::bridge::BridgeState;
use crate::upstream::messages::{CommandAction, CommandParams, RelayEvent, RelayRequest};
use crate::Result;

type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Owns the relay connection. The loop in run() never exits on its own:
/// reconnection is unconditional and infinite, with a fixed delay.
pub struct UpstreamClient {
    url: String,
    reconnect_delay: Duration,
    drain_on_kick: bool,
    state: Arc<BridgeState>,
    shutdown: watch::Receiver<bool>,
}

impl UpstreamClient {
    pub fn new(
        relay_url: &str,
        client_id: &str,
        reconnect_delay: Duration,
        drain_on_kick: bool,
        state: Arc<BridgeState>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let separator = if relay_url.contains('?') { '&' } else { '?' };
        Self {
            url: format!("{}{}clientId={}", relay_url, separator, client_id),
            reconnect_delay,
            drain_on_kick,
            state,
            shutdown,
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut shutdown = self.shutdown.clone();
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            self.state.link.set_connecting().await;
            info!("🔗 Connecting to relay...");
            match connect_async(self.url.as_str()).await {
                Ok((ws, _response)) => {
                    info!("🔗 Connected to relay");
                    let (sink, stream) = ws.split();
                    self.state.link.set_connected(sink).await;
                    match self.state.link.send_raw(&RelayRequest::auth()).await {
                        Ok(()) => self.read_loop(stream, &mut shutdown).await,
                        Err(e) => warn!("Failed to send auth: {}", e),
                    }
                }
                Err(e) => warn!("Relay connect failed: {}", e),
            }
            self.state.link.set_disconnected().await;

            if *shutdown.borrow() {
                return Ok(());
            }
            info!("🔁 Reconnecting in {}s...", self.reconnect_delay.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn read_loop(&self, mut stream: WsStream, shutdown: &mut watch::Receiver<bool>) {
        loop {
            tokio::select! {
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => self.handle_message(&text).await,
                        Some(Ok(Message::Close(_))) => {
                            info!("📡 Relay closed the connection");
                            return;
                        }
                        // Transport pings are answered by the socket layer
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("📡 Relay read failed: {}", e);
                            return;
                        }
                        None => {
                            info!("📡 Relay connection ended");
                            return;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    async fn handle_message(&self, text: &str) {
        let event: RelayEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                // Malformed relay line: log and drop, keep the connection.
                warn!("Dropping malformed relay message: {}", e);
                return;
            }
        };

        match event {
            RelayEvent::Authed => {
                info!("🔐 Authenticated with relay");
                self.state.link.set_authenticated().await;
                self.state.drain_pending().await;
            }
            RelayEvent::Job { params } => {
                self.state.publish_job(params).await;
            }
            RelayEvent::HashAccepted | RelayEvent::ShareResult => {
                self.state.record_accepted();
                debug!("Share accepted by pool");
            }
            RelayEvent::Pong => {
                debug!("Relay pong");
            }
            RelayEvent::Command { params } => {
                self.handle_command(params).await;
            }
            RelayEvent::Error { params } => {
                let detail = params
                    .and_then(|p| p.error)
                    .unwrap_or_else(|| "unspecified".to_string());
                warn!("❌ Relay error: {}", detail);
            }
            RelayEvent::Unknown => {
                debug!("Ignoring unknown relay message type");
            }
        }
    }

    async fn handle_command(&self, command: CommandParams) {
        let reason = command.reason.as_deref().unwrap_or("no reason given");
        match command.action {
            CommandAction::Kick => {
                warn!("⚠️ Kicked by relay ({}), exiting", reason);
                let pending = self.state.pending.len();
                if self.drain_on_kick && pending > 0 {
                    let drained = self.state.drain_pending().await;
                    info!("Drained {}/{} queued shares before exit", drained, pending);
                } else if pending > 0 {
                    warn!("Discarding {} queued shares", pending);
                }
                std::process::exit(0);
            }
            action => {
                info!("🕹️ Relay command {:?} ({})", action, reason);
                self.state.link.apply_command(action).await;
            }
        }
    }
}

/// Keepalive timer: a transient ping per period while authenticated,
/// silently skipped otherwise. Never queued.
pub async fn run_keepalive(
    state: Arc<BridgeState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if state.link.is_authenticated().await {
                    if let Err(e) = state.link.send(&RelayRequest::Ping).await {
                        debug!("Keepalive ping dropped: {}", e);
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

// Changelog:
// - v1.3.0 (2025-08-02): Optional ordered drain before honoring a kick.
// - v1.2.0 (2025-07-30): Drain the pending queue on authed, not on connect;
//   a connection that never authenticates must not consume queued shares.
// - v1.1.0 (2025-07-21): Fixed-delay reconnect loop with shutdown select.
// - v1.0.0 (2025-07-12): Initial relay client.
