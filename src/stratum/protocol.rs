// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/stratum/protocol.rs
// Version: 1.0.1
//
// This file implements the local stratum dialect for the XMRig Bridge,
// located in the stratum subdirectory. It constructs the JSON-RPC responses
// and server pushes that XMRig-style miners expect on the local port.
//
// Tree Location:
// - src/stratum/protocol.rs (stratum response construction)
// - Depends on: serde_json, crate::core::types

use serde_json::{json, Value};

use crate::core::types::Job;

/// Constructs messages for the local stratum dialect
pub struct StratumProtocol;

impl StratumProtocol {
    /// Response to a successful login: session id, current (or placeholder)
    /// job, and status OK.
    pub fn login_response(id: &Option<Value>, client_id: u64, job: &Job) -> Value {
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "result": {
                "id": format!("xmrig-{}", client_id),
                "job": job,
                "status": "OK"
            },
            "error": null
        })
    }

    /// Immediate acknowledgement of a share submission. Sent regardless of
    /// upstream outcome; the relay is authoritative, not the bridge.
    pub fn submit_response(id: &Option<Value>) -> Value {
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "result": { "status": "OK" },
            "error": null
        })
    }

    pub fn keepalived_response(id: &Option<Value>) -> Value {
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "result": { "status": "KEEPALIVED" },
            "error": null
        })
    }

    /// Server-initiated job push broadcast to every registered miner
    pub fn job_notification(job: &Job) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": "job",
            "params": job
        })
    }

    /// Convert a JSON message to its newline-delimited wire form
    pub fn to_message(json: Value) -> String {
        format!("{}\n", json)
    }
}


// Changelog:
// - v1.0.1 (2025-07-21): Echo the request id verbatim (null when absent).
// - v1.0.0 (2025-07-12): Initial dialect builders.
