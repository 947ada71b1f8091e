// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/stratum/server.rs
// Version: 1.2.0
//
// This file implements the local stratum listener for the XMRig Bridge,
// located in the stratum subdirectory. It accepts miner connections on the
// local port and runs one task per connection handling login, submit, and
// keepalived requests. One stalled miner never blocks the accept loop or
// any other connection.
//
// Tree Location:
// - src/stratum/server.rs (local stratum listener)
// - Depends on: tokio, serde_json, thiserror, crate::bridge, crate::stratum::protocol

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::registry::MinerWriter;
use crate::bridge::BridgeState;
use crate::core::types::{Share, StratumRequest};
use crate::stratum::protocol::StratumProtocol;
use crate::Result;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// How one request line was handled. Parse failures drop the line and keep
/// the connection; socket failures close it.
#[derive(Debug, Error)]
enum ClientError {
    #[error("malformed request: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

enum LineOutcome {
    Continue,
    Close,
}

/// Local stratum listener. Bound separately from run so callers can learn
/// the actual port before miners connect.
pub struct StratumServer {
    listener: TcpListener,
}

impl StratumServer {
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each accepted connection gets its own task; the loop
    /// itself only accepts and spawns.
    pub async fn run(
        self,
        state: Arc<BridgeState>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        info!("⛏️ Stratum listener on {}", self.local_addr()?);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
                            info!("⛏️ Miner #{} connected from {}", client_id, peer);
                            let state = Arc::clone(&state);
                            let shutdown = shutdown.clone();
                            tokio::spawn(async move {
                                handle_connection(client_id, stream, state, shutdown).await;
                            });
                        }
                        Err(e) => warn!("Accept failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Stratum listener shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Per-connection read loop. Registration happens on login; deregistration
/// on EOF, socket error, rejected login, or shutdown.
async fn handle_connection(
    client_id: u64,
    stream: TcpStream,
    state: Arc<BridgeState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (reader, writer) = stream.into_split();
    let writer: MinerWriter = Arc::new(tokio::sync::Mutex::new(writer));
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match handle_line(client_id, &line, &writer, &state).await {
                            Ok(LineOutcome::Continue) => {}
                            Ok(LineOutcome::Close) => break,
                            Err(ClientError::Parse(e)) => {
                                // Drop the offending line, keep the miner.
                                warn!("Miner #{} sent malformed line: {}", client_id, e);
                            }
                            Err(ClientError::Io(e)) => {
                                warn!("Miner #{} write failed: {}", client_id, e);
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("Miner #{} closed the connection", client_id);
                        break;
                    }
                    Err(e) => {
                        warn!("Miner #{} read failed: {}", client_id, e);
                        break;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    if state.registry.remove(client_id) {
        info!("⛏️ Miner #{} disconnected ({} active)", client_id, state.registry.len());
    }
}

async fn handle_line(
    client_id: u64,
    line: &str,
    writer: &MinerWriter,
    state: &Arc<BridgeState>,
) -> std::result::Result<LineOutcome, ClientError> {
    let request: StratumRequest = serde_json::from_str(line)?;

    match request.method.as_str() {
        "login" => {
            let control = state.link.control().await;
            if control.is_halted() {
                // New miners cannot attach while mining is halted; miners
                // that are already attached stay.
                info!("🚫 Rejecting login from miner #{}: control state {:?}", client_id, control);
                return Ok(LineOutcome::Close);
            }
            state.registry.insert(client_id, Arc::clone(writer));
            let job = state.get_or_placeholder();
            let response = StratumProtocol::to_message(StratumProtocol::login_response(
                &request.id,
                client_id,
                &job,
            ));
            writer.lock().await.write_all(response.as_bytes()).await?;
            info!(
                "✅ Miner #{} logged in (job {}, {} active)",
                client_id,
                job.job_id,
                state.registry.len()
            );
        }
        "submit" => {
            let share: Share = serde_json::from_value(request.params.clone())?;
            debug!("Miner #{} submitted share for job {}", client_id, share.job_id);
            state.submit_share(share).await;
            // Acknowledge unconditionally; the relay is authoritative and
            // the miner is never made to wait for it.
            let response = StratumProtocol::to_message(StratumProtocol::submit_response(&request.id));
            writer.lock().await.write_all(response.as_bytes()).await?;
        }
        "keepalived" => {
            let response =
                StratumProtocol::to_message(StratumProtocol::keepalived_response(&request.id));
            writer.lock().await.write_all(response.as_bytes()).await?;
        }
        other => {
            debug!("Miner #{} sent unsupported method {:?}", client_id, other);
        }
    }
    Ok(LineOutcome::Continue)
}

// Changelog:
// - v1.2.0 (2025-07-30): Login gating on the consolidated control state.
// - v1.1.0 (2025-07-21): Parse-vs-io error split; malformed lines no longer
//   close the connection.
// - v1.0.0 (2025-07-12): Initial listener.
