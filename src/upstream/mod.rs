// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/upstream/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for the relay side of the bridge,
// located in the upstream subdirectory.
//
// Tree Location:
// - src/upstream/mod.rs (upstream module entry point)
// - Submodules: client, link, messages, queue

pub mod client;
pub mod link;
pub mod messages;
pub mod queue;

// Re-export key types for convenience
pub use client::UpstreamClient;
pub use link::UpstreamLink;
pub use messages::{RelayEvent, RelayRequest};
pub use queue::PendingShareQueue;

// Changelog:
// - v1.0.0 (2025-07-12): Initial module layout.
