// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.1
//
// This file serves as the main library entry point for the XMRig Bridge,
// located at the root of the source tree. It exports all public modules
// and types that other crates or binaries can use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, bridge, stratum, upstream, status, utils

pub mod bridge;
pub mod core;
pub mod status;
pub mod stratum;
pub mod upstream;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::bridge::BridgeState;
pub use crate::core::difficulty::target_to_difficulty;
pub use crate::core::types::{Args, BridgeStatus, ControlState, Job, LinkState, Share};
pub use crate::stratum::server::StratumServer;
pub use crate::upstream::client::UpstreamClient;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Changelog:
// - v1.0.1 (2025-07-30): Re-exported BridgeStatus and ControlState for tests.
// - v1.0.0 (2025-07-12): Initial modular layout.
//   - Purpose: Establishes the library root, organizing the project into
//     core, bridge, stratum, upstream, status, and utils modules.
//   - Features: Exports key types (e.g., BridgeState, Job, StratumServer)
//     and defines the common Result type used across the crate.
