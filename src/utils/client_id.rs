// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/client_id.rs
// Version: 1.0.1
//
// This file manages the persisted client id for the XMRig Bridge, located in
// the utils subdirectory. The id disambiguates this bridge's relay
// connection; it is generated once and reused across restarts. The bridge
// treats it as an opaque string.
//
// Tree Location:
// - src/utils/client_id.rs (client id persistence)
// - Depends on: rand, std

use std::fs;
use std::path::Path;

use tracing::info;

use crate::Result;

/// Read the persisted client id, or generate and persist a fresh one.
///
/// The id is 16 hex chars of randomness. An existing file wins even if it
/// holds an id from an older version; the relay only needs stability.
pub fn get_or_create_client_id(path: &Path) -> Result<String> {
    if path.exists() {
        let id = fs::read_to_string(path)?.trim().to_string();
        if !id.is_empty() {
            return Ok(id);
        }
    }
    let id = format!("{:016x}", rand::random::<u64>());
    fs::write(path, &id)?;
    info!("🆔 Generated new client id {}", id);
    Ok(id)
}


// Changelog:
// - v1.0.1 (2025-07-21): Regenerate when the file exists but is empty.
// - v1.0.0 (2025-07-12): Initial persistence.
