// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bridge/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the shared bridge state, located
// in the bridge subdirectory. It declares submodules and re-exports key
// types for use throughout the project.
//
// Tree Location:
// - src/bridge/mod.rs (bridge module entry point)
// - Submodules: hashrate, registry, state

pub mod hashrate;
pub mod registry;
pub mod state;

// Re-export key types for convenience
pub use hashrate::HashrateEstimator;
pub use registry::{MinerRegistry, MinerWriter};
pub use state::{BridgeState, BridgeStats};

// Changelog:
// - v1.0.0 (2025-07-12): Initial module layout.
