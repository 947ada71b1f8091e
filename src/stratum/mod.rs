// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/stratum/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the local stratum side of the
// bridge, located in the stratum subdirectory.
//
// Tree Location:
// - src/stratum/mod.rs (stratum module entry point)
// - Submodules: protocol, server

pub mod protocol;
pub mod server;

// Re-export key types for convenience
pub use protocol::StratumProtocol;
pub use server::StratumServer;

// Changelog:
// - v1.0.0 (2025-07-12): Initial module layout.
