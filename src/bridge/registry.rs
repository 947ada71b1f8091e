// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bridge/registry.rs
// Version: 1.0.1
//
// This file implements the registry of connected miner sockets for the
// XMRig Bridge, located in the bridge subdirectory. Connections register on
// login and are pruned on disconnect or write failure.
//
// Tree Location:
// - src/bridge/registry.rs (miner connection registry and broadcast)
// - Depends on: tokio, std

use std::collections::HashMap;
use std::sync::Mutex;

use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{debug, warn};

/// Shared write half of one miner connection. The connection handler and
/// job broadcasts write through the same handle.
pub type MinerWriter = Arc<tokio::sync::Mutex<OwnedWriteHalf>>;

/// Registry of logged-in miner connections.
///
/// Critical-section contract: the map mutex is held only for insert,
/// remove, count, and snapshot; never across an await. Broadcasts iterate
/// a snapshot so a connection removed mid-broadcast cannot invalidate the
/// iteration.
pub struct MinerRegistry {
    clients: Mutex<HashMap<u64, MinerWriter>>,
}

impl MinerRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, client_id: u64, writer: MinerWriter) {
        self.clients.lock().unwrap().insert(client_id, writer);
    }

    pub fn remove(&self, client_id: u64) -> bool {
        self.clients.lock().unwrap().remove(&client_id).is_some()
    }

    /// Number of currently registered miners
    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<(u64, MinerWriter)> {
        self.clients
            .lock()
            .unwrap()
            .iter()
            .map(|(id, w)| (*id, Arc::clone(w)))
            .collect()
    }

    /// Write one newline-terminated line to every registered miner.
    ///
    /// Best effort per connection: a failed write deregisters that miner
    /// and delivery continues to the rest.
    pub async fn broadcast(&self, line: &str) {
        for (client_id, writer) in self.snapshot() {
            let mut writer = writer.lock().await;
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                drop(writer);
                warn!("Dropping miner #{} after failed write: {}", client_id, e);
                self.remove(client_id);
            } else {
                debug!("Broadcast delivered to miner #{}", client_id);
            }
        }
    }
}

impl Default for MinerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Changelog:
// - v1.0.1 (2025-07-21): Documented the snapshot contract.
// - v1.0.0 (2025-07-12): Initial registry.
