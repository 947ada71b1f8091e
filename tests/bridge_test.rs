// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/bridge_test.rs
// Version: 1.0.1
//
// This file contains socket-level end-to-end tests for the XMRig Bridge,
// located in the tests directory. Real miner connections talk to the local
// stratum listener and a minimal in-process WebSocket relay plays the
// upstream side.
//
// Tree Location:
// - tests/bridge_test.rs (end-to-end tests)
// - Depends on: xmrig-bridge, tokio, tokio-tungstenite, futures-util, serde_json

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::{mpsc, watch};
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message;

    use xmrig_bridge::core::types::Share;
    use xmrig_bridge::upstream::messages::CommandAction;
    use xmrig_bridge::{BridgeState, Job, StratumServer, UpstreamClient};

    type MinerLines = tokio::io::Lines<BufReader<OwnedReadHalf>>;

    const WAIT: Duration = Duration::from_secs(5);

    async fn start_bridge() -> (Arc<BridgeState>, SocketAddr, watch::Sender<bool>) {
        let state = Arc::new(BridgeState::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = StratumServer::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run(Arc::clone(&state), shutdown_rx));
        (state, addr, shutdown_tx)
    }

    async fn connect_miner(addr: SocketAddr) -> (MinerLines, OwnedWriteHalf) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        (BufReader::new(reader).lines(), writer)
    }

    async fn send_line(writer: &mut OwnedWriteHalf, value: &Value) {
        writer
            .write_all(format!("{}\n", value).as_bytes())
            .await
            .unwrap();
    }

    async fn read_json(lines: &mut MinerLines) -> Value {
        let line = timeout(WAIT, lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed unexpectedly");
        serde_json::from_str(&line).unwrap()
    }

    async fn login(addr: SocketAddr, rpc_id: u64) -> (MinerLines, OwnedWriteHalf, Value) {
        let (mut lines, mut writer) = connect_miner(addr).await;
        send_line(
            &mut writer,
            &json!({
                "id": rpc_id,
                "method": "login",
                "params": {"login": "wallet", "pass": "x", "agent": "xmrig/6.21.0"}
            }),
        )
        .await;
        let response = read_json(&mut lines).await;
        (lines, writer, response)
    }

    async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("timed out waiting for {}", what);
    }

    /// Minimal relay: accepts WebSocket connections, answers auth with
    /// authed, and forwards every message it receives to the test.
    async fn spawn_fake_relay() -> (String, mpsc::UnboundedReceiver<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/proxy", listener.local_addr().unwrap());
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let seen_tx = seen_tx.clone();
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    while let Some(Ok(message)) = ws.next().await {
                        if let Message::Text(text) = message {
                            let value: Value = serde_json::from_str(&text).unwrap();
                            let is_auth = value["type"] == "auth";
                            seen_tx.send(value).ok();
                            if is_auth {
                                ws.send(Message::Text(r#"{"type":"authed"}"#.to_string()))
                                    .await
                                    .ok();
                            }
                        }
                    }
                });
            }
        });
        (url, seen_rx)
    }

    fn spawn_upstream(url: &str, state: &Arc<BridgeState>) -> watch::Sender<bool> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let client = UpstreamClient::new(
            url,
            "it-client",
            Duration::from_millis(200),
            false,
            Arc::clone(state),
            shutdown_rx,
        );
        tokio::spawn(client.run());
        shutdown_tx
    }

    async fn recv_json(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
        timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for a relay message")
            .expect("relay channel closed")
    }

    #[tokio::test]
    async fn test_end_to_end_job_flow_and_drain() {
        let (state, addr, _bridge_shutdown) = start_bridge().await;

        // Three miners log in before any job exists
        let mut miners = Vec::new();
        for n in 1..=3u64 {
            let (lines, writer, response) = login(addr, n).await;
            assert_eq!(response["result"]["status"], "OK");
            assert_eq!(
                response["result"]["job"]["job_id"], "waiting",
                "Pre-job login must see the placeholder"
            );
            miners.push((lines, writer));
        }
        wait_for("all miners registered", || state.registry.len() == 3).await;

        // A real job arrives and reaches all three
        let job: Job = serde_json::from_value(json!({
            "job_id": "job-1",
            "blob": "ab".repeat(76),
            "target": "a0000000",
            "seed_hash": "0".repeat(64),
            "height": 7777,
            "algo": "rx/0"
        }))
        .unwrap();
        state.publish_job(job).await;
        assert_eq!(state.current_difficulty(), 0xFFFFFFFFu64 / 0xa0);
        for (lines, _writer) in miners.iter_mut() {
            let push = read_json(lines).await;
            assert_eq!(push["method"], "job");
            assert_eq!(push["params"]["job_id"], "job-1");
            assert_eq!(push["params"]["height"], 7777);
        }

        // A share submitted while upstream is down parks in the queue
        let (lines0, writer0) = &mut miners[0];
        send_line(
            writer0,
            &json!({
                "id": 10,
                "method": "submit",
                "params": {
                    "id": "xmrig-1",
                    "job_id": "job-1",
                    "nonce": "deadbeef",
                    "result": "00".repeat(32)
                }
            }),
        )
        .await;
        let ack = read_json(lines0).await;
        assert_eq!(
            ack["result"]["status"], "OK",
            "Submit is acked regardless of upstream state"
        );
        wait_for("share queued", || state.pending.len() == 1).await;

        // The relay comes up; the queued share is delivered in order and
        // the queue count returns to zero
        let (url, mut seen) = spawn_fake_relay().await;
        let _upstream_shutdown = spawn_upstream(&url, &state);

        let auth = recv_json(&mut seen).await;
        assert_eq!(auth["type"], "auth");
        let submit = recv_json(&mut seen).await;
        assert_eq!(submit["type"], "submit");
        assert_eq!(submit["params"]["job_id"], "job-1");
        assert_eq!(submit["params"]["nonce"], "deadbeef");
        wait_for("queue drained", || state.pending.is_empty()).await;
    }

    #[tokio::test]
    async fn test_offline_shares_drain_in_submission_order() {
        let state = Arc::new(BridgeState::new());
        for n in 0..3u32 {
            state
                .submit_share(Share {
                    job_id: format!("job-{}", n),
                    nonce: format!("{:08x}", n),
                    result: "00".to_string(),
                })
                .await;
        }
        assert_eq!(state.pending.len(), 3);

        let (url, mut seen) = spawn_fake_relay().await;
        let _upstream_shutdown = spawn_upstream(&url, &state);

        assert_eq!(recv_json(&mut seen).await["type"], "auth");
        for n in 0..3u32 {
            let submit = recv_json(&mut seen).await;
            assert_eq!(submit["type"], "submit");
            assert_eq!(
                submit["params"]["job_id"],
                format!("job-{}", n),
                "Drain must preserve submission order"
            );
        }
        wait_for("queue drained", || state.pending.is_empty()).await;
    }

    #[tokio::test]
    async fn test_login_rejected_while_halted() {
        let (state, addr, _bridge_shutdown) = start_bridge().await;

        let (_lines1, _writer1, response) = login(addr, 1).await;
        assert_eq!(response["result"]["status"], "OK");
        wait_for("first miner registered", || state.registry.len() == 1).await;

        // A paused bridge refuses new logins but keeps attached miners
        state.link.apply_command(CommandAction::Pause).await;
        let (mut lines2, mut writer2) = connect_miner(addr).await;
        send_line(&mut writer2, &json!({"id": 1, "method": "login", "params": {}})).await;
        let refused = timeout(WAIT, lines2.next_line())
            .await
            .expect("timed out")
            .unwrap();
        assert!(refused.is_none(), "Login during pause must close the connection");
        assert_eq!(state.registry.len(), 1, "The attached miner is untouched");

        // Resume re-opens the door
        state.link.apply_command(CommandAction::Resume).await;
        let (_lines3, _writer3, response) = login(addr, 2).await;
        assert_eq!(response["result"]["status"], "OK");
    }

    #[tokio::test]
    async fn test_malformed_line_keeps_connection() {
        let (_state, addr, _bridge_shutdown) = start_bridge().await;
        let (mut lines, mut writer, _response) = login(addr, 1).await;

        writer.write_all(b"this is not json\n").await.unwrap();
        send_line(&mut writer, &json!({"id": 2, "method": "keepalived", "params": {}})).await;
        let response = read_json(&mut lines).await;
        assert_eq!(
            response["result"]["status"], "KEEPALIVED",
            "Connection must survive a malformed line"
        );
    }

    #[tokio::test]
    async fn test_disconnect_deregisters_and_broadcast_continues() {
        let (state, addr, _bridge_shutdown) = start_bridge().await;
        let (mut survivor_lines, _survivor_writer, _r1) = login(addr, 1).await;
        let (dead_lines, dead_writer, _r2) = login(addr, 2).await;
        wait_for("both miners registered", || state.registry.len() == 2).await;

        drop(dead_lines);
        drop(dead_writer);
        wait_for("dead miner deregistered", || state.registry.len() == 1).await;

        let job: Job = serde_json::from_value(json!({"job_id": "job-9", "target": "a0000000"})).unwrap();
        state.publish_job(job).await;
        let push = read_json(&mut survivor_lines).await;
        assert_eq!(push["params"]["job_id"], "job-9", "Survivors still receive jobs");
    }
}

// Changelog:
// - v1.0.1 (2025-08-02): Cover login gating and malformed-line recovery.
// - v1.0.0 (2025-07-21): Initial end-to-end tests with an in-process relay.
