// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.2.0
//
// This file defines core data structures for the XMRig Bridge, located in the
// core subdirectory. It includes types for command-line arguments, relay jobs,
// shares, stratum requests, and the bridge state machines.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde

use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments for the XMRig Bridge
#[derive(Parser, Debug, Clone)]
#[command(
    name = "xbridge",
    version,
    about = "WebSocket-to-stratum bridge for XMRig-style miners",
    long_about = "XMRig Bridge holds an authenticated WebSocket connection to a remote relay\n\
                  and exposes a plain local stratum port that XMRig can mine against.\n\
                  Miners keep their current job and queue their shares while the relay\n\
                  link is down; queued shares are delivered in order on reconnect.\n\n\
                  Examples:\n\
                    xbridge -o wss://relay.example.com/proxy\n\
                    xbridge -o ws://127.0.0.1:8888 --port 3334 --drain-on-kick\n\n\
                  Point your XMRig to: stratum+tcp://127.0.0.1:3333"
)]
pub struct Args {
    /// Relay WebSocket URL (ws:// or wss://)
    /// Examples: wss://relay.example.com/proxy, ws://127.0.0.1:8888
    #[arg(
        short = 'o',
        long = "relay",
        value_name = "URL",
        help = "Relay WebSocket URL (ws:// or wss://)"
    )]
    pub relay: String,

    /// Local stratum port that miners connect to
    #[arg(
        short = 'p',
        long = "port",
        default_value = "3333",
        value_name = "PORT",
        help = "Local stratum listen port"
    )]
    pub port: u16,

    /// Local bind address for the stratum listener
    /// Use 0.0.0.0 to accept miners from other hosts
    #[arg(
        long = "bind",
        default_value = "127.0.0.1",
        value_name = "ADDR",
        help = "Local stratum bind address"
    )]
    pub bind: String,

    /// File holding the persisted client id (created on first run)
    #[arg(
        long = "client-id-file",
        default_value = ".bridge_client_id",
        value_name = "PATH",
        help = "Path of the persisted client id file"
    )]
    pub client_id_file: PathBuf,

    /// Delay between relay reconnect attempts, in seconds.
    /// The delay is fixed: no exponential growth, no retry cap.
    #[arg(
        long = "reconnect-delay",
        default_value = "5",
        value_name = "SECONDS",
        help = "Fixed relay reconnect delay in seconds"
    )]
    pub reconnect_delay: u64,

    /// Status report interval, in seconds
    #[arg(
        long = "status-interval",
        default_value = "10",
        value_name = "SECONDS",
        help = "Status report interval in seconds"
    )]
    pub status_interval: u64,

    /// Keepalive ping interval, in seconds
    #[arg(
        long = "ping-interval",
        default_value = "20",
        value_name = "SECONDS",
        help = "Relay keepalive ping interval in seconds"
    )]
    pub ping_interval: u64,

    /// Attempt one ordered drain of the pending share queue before honoring
    /// a remote kick. Off by default: a kick exits immediately and queued
    /// shares are discarded.
    #[arg(
        long = "drain-on-kick",
        default_value = "false",
        help = "Drain queued shares once before exiting on a remote kick"
    )]
    pub drain_on_kick: bool,
}

impl Args {
    /// Validate arguments and return helpful errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.relay.starts_with("ws://") && !self.relay.starts_with("wss://") {
            return Err("Relay URL must start with ws:// or wss://".to_string());
        }
        if self.port == 0 {
            return Err("Listen port must be non-zero".to_string());
        }
        if self.reconnect_delay == 0 {
            return Err("Reconnect delay must be greater than 0 seconds".to_string());
        }
        if self.status_interval == 0 || self.ping_interval == 0 {
            return Err("Status and ping intervals must be greater than 0 seconds".to_string());
        }
        Ok(())
    }
}

/// Blob width of the placeholder job, in bytes
const PLACEHOLDER_BLOB_LEN: usize = 76;

/// A work descriptor issued by the relay and handed to miners unmodified.
///
/// Jobs are immutable once published: a new job replaces the old one
/// wholesale, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier from the relay
    pub job_id: String,

    /// Hex-encoded hashing blob
    #[serde(default)]
    pub blob: String,

    /// Hex-encoded target (little-endian 32-bit compact form)
    #[serde(default)]
    pub target: String,

    /// Seed hash for RandomX dataset selection
    #[serde(default)]
    pub seed_hash: Option<String>,

    /// Blockchain height for this job
    #[serde(default)]
    pub height: u64,

    /// Mining algorithm tag (e.g. rx/0)
    #[serde(default)]
    pub algo: Option<String>,
}

impl Job {
    /// Sentinel job id handed out before the relay has sent a real job
    pub const WAITING_ID: &'static str = "waiting";

    /// A structurally valid job for miners that log in before the first
    /// real job arrives. Zeroed blob and seed, minimal target.
    pub fn placeholder() -> Self {
        Self {
            job_id: Self::WAITING_ID.to_string(),
            blob: "00".repeat(PLACEHOLDER_BLOB_LEN),
            target: "ffffffff".to_string(),
            seed_hash: Some("0".repeat(64)),
            height: 0,
            algo: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.job_id == Self::WAITING_ID
    }
}

/// A miner's claimed solution to a job. Created on `submit`, forwarded or
/// queued, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Job ID this share answers
    pub job_id: String,

    /// Hex-encoded nonce
    pub nonce: String,

    /// Hex-encoded result hash
    pub result: String,
}

/// One newline-delimited JSON-RPC request from a local miner
#[derive(Debug, Clone, Deserialize)]
pub struct StratumRequest {
    /// Request id, echoed back verbatim in the response
    #[serde(default)]
    pub id: Option<serde_json::Value>,

    /// Method name: login, submit, or keepalived
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Lifecycle of the relay connection. Owned solely by the upstream
/// transport manager; everything else only asks "is it usable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Authenticated,
}

/// Remote-commanded mining state, consolidated from the old
/// mining_paused/pool_suspended flag pair into one ordered value.
/// Suspended implies paused; `stop` could never set one without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlState {
    Mining,
    Paused,
    Suspended,
}

impl ControlState {
    /// True while new miner logins must be rejected
    pub fn is_halted(self) -> bool {
        self > ControlState::Mining
    }

    /// The status contribution of this control state
    pub fn as_status(self) -> BridgeStatus {
        match self {
            ControlState::Mining => BridgeStatus::Mining,
            ControlState::Paused => BridgeStatus::Paused,
            ControlState::Suspended => BridgeStatus::PoolSuspended,
        }
    }
}

/// Effective bridge status as reported upstream. Variant order IS the
/// precedence: the reported status is the max of all contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BridgeStatus {
    Mining,
    TempThrottle,
    TempStop,
    Paused,
    PoolSuspended,
}

impl BridgeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BridgeStatus::Mining => "mining",
            BridgeStatus::TempThrottle => "temp-throttle",
            BridgeStatus::TempStop => "temp-stop",
            BridgeStatus::Paused => "paused",
            BridgeStatus::PoolSuspended => "pool-suspended",
        }
    }
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Changelog:
// - v1.2.0 (2025-07-30): Consolidated control flags into ControlState.
//   - Replaced the mining_paused/pool_suspended booleans with one ordered
//     enum; status precedence now falls out of the derived Ord.
//   - Added BridgeStatus with as_str for the relay status_update payload.
// - v1.1.0 (2025-07-21): Added --drain-on-kick and interval arguments.
// - v1.0.0 (2025-07-12): Initial types.
//   - Args with validate(), Job with placeholder(), Share, StratumRequest,
//     LinkState.
