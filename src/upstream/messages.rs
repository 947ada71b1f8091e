// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/upstream/messages.rs
// Version: 1.1.0
//
// This file defines the message-typed JSON protocol spoken over the relay
// WebSocket, located in the upstream subdirectory. Outbound messages carry a
// "type" tag plus params; inbound messages are dispatched on the same tag.
//
// Tree Location:
// - src/upstream/messages.rs (relay wire protocol)
// - Depends on: serde, crate::core::types

use serde::{Deserialize, Serialize};

use crate::core::types::{Job, Share};

/// Agent string sent with the auth handshake
pub const BRIDGE_AGENT: &str = concat!("xmrig-bridge/", env!("CARGO_PKG_VERSION"));

/// Messages the bridge sends to the relay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayRequest {
    Auth { params: AuthParams },
    Submit { params: Share },
    Ping,
    StatusUpdate { params: StatusParams },
}

impl RelayRequest {
    pub fn auth() -> Self {
        RelayRequest::Auth {
            params: AuthParams {
                agent: BRIDGE_AGENT.to_string(),
            },
        }
    }

    /// Submit messages are the only kind that may be queued while the
    /// relay link is down; everything else is transient.
    pub fn is_submit(&self) -> bool {
        matches!(self, RelayRequest::Submit { .. })
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthParams {
    pub agent: String,
}

/// Payload of the periodic status_update message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusParams {
    pub status: String,
    pub temperature: Option<f32>,
    pub hashrate: f64,
    pub active_client_count: u64,
    pub pending_share_count: u64,
    pub total_submitted: u64,
}

/// Messages the relay sends to the bridge. Unknown types are tolerated so
/// a newer relay never wedges the read loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    Authed,
    Job { params: Job },
    HashAccepted,
    ShareResult,
    Pong,
    Command { params: CommandParams },
    Error {
        #[serde(default)]
        params: Option<ErrorParams>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandParams {
    pub action: CommandAction,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub threads: Option<u32>,
}

/// Remote control actions. `threads` on the wrapping command is accepted
/// and ignored: the bridge has no local workers to resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Stop,
    Pause,
    Start,
    Resume,
    Kick,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorParams {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_wire_shape() {
        let msg = RelayRequest::Submit {
            params: Share {
                job_id: "job-1".to_string(),
                nonce: "a1b2c3d4".to_string(),
                result: "00ff".to_string(),
            },
        };
        let text = msg.to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "submit");
        assert_eq!(value["params"]["job_id"], "job-1");
        assert_eq!(value["params"]["nonce"], "a1b2c3d4");
    }

    #[test]
    fn test_status_update_wire_shape() {
        let msg = RelayRequest::StatusUpdate {
            params: StatusParams {
                status: "mining".to_string(),
                temperature: Some(52.0),
                hashrate: 1234.5,
                active_client_count: 2,
                pending_share_count: 0,
                total_submitted: 7,
            },
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_text().unwrap()).unwrap();
        assert_eq!(value["type"], "status_update");
        assert_eq!(value["params"]["status"], "mining");
        assert_eq!(value["params"]["pending_share_count"], 0);
    }

    #[test]
    fn test_parse_job_event() {
        let text = r#"{"type":"job","params":{"job_id":"j1","blob":"00","target":"a0000000","height":42}}"#;
        match serde_json::from_str::<RelayEvent>(text).unwrap() {
            RelayEvent::Job { params } => {
                assert_eq!(params.job_id, "j1");
                assert_eq!(params.target, "a0000000");
                assert_eq!(params.height, 42);
            }
            other => panic!("Expected job event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_command_event() {
        let text = r#"{"type":"command","params":{"action":"stop","reason":"maintenance"}}"#;
        match serde_json::from_str::<RelayEvent>(text).unwrap() {
            RelayEvent::Command { params } => {
                assert_eq!(params.action, CommandAction::Stop);
                assert_eq!(params.reason.as_deref(), Some("maintenance"));
                assert_eq!(params.threads, None);
            }
            other => panic!("Expected command event, got {:?}", other),
        }
    }

    #[test]
    fn test_authed_tolerates_extra_fields() {
        let text = r#"{"type":"authed","params":{"session":"abc"}}"#;
        assert!(matches!(
            serde_json::from_str::<RelayEvent>(text).unwrap(),
            RelayEvent::Authed
        ));
    }

    #[test]
    fn test_unknown_event_type() {
        let text = r#"{"type":"promo","params":{}}"#;
        assert!(matches!(
            serde_json::from_str::<RelayEvent>(text).unwrap(),
            RelayEvent::Unknown
        ));
    }
}

// Changelog:
// - v1.1.0 (2025-07-30): Tolerate unknown inbound types via serde(other).
// - v1.0.0 (2025-07-12): Initial protocol types from the relay dialect.
