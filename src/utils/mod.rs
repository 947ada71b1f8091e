// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/mod.rs
// Version: 1.0.0
//
// This file is the module declaration for bridge utilities, located in the
// utils subdirectory.

pub mod client_id;
pub mod format;

// Re-export key items for convenience
pub use client_id::get_or_create_client_id;
pub use format::FormatUtils;

// Changelog:
// - v1.0.0 (2025-07-12): Initial module layout.
