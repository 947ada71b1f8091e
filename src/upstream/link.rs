// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/upstream/link.rs
// Version: 1.1.0
//
// This file implements the shared relay link handle for the XMRig Bridge,
// located in the upstream subdirectory. Link state, control state, and the
// WebSocket write half are one guarded unit: command application and
// reconnect transitions are always observed consistently.
//
// Tree Location:
// - src/upstream/link.rs (link state machine + shared write handle)
// - Depends on: tokio, tokio-tungstenite, futures-util

use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::core::types::{ControlState, LinkState};
use crate::upstream::messages::{CommandAction, RelayRequest};
use crate::Result;

/// Write half of the relay WebSocket
pub type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

struct LinkInner {
    state: LinkState,
    control: ControlState,
    sink: Option<WsSink>,
}

/// The single guarded unit of relay-side mutable state.
///
/// Only the upstream transport manager transitions the link state; other
/// components read it or send through it. A failed send transitions to
/// Disconnected in the same critical section, so no caller can observe a
/// usable state with a dead sink.
pub struct UpstreamLink {
    inner: Mutex<LinkInner>,
}

impl UpstreamLink {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LinkInner {
                state: LinkState::Disconnected,
                control: ControlState::Mining,
                sink: None,
            }),
        }
    }

    pub async fn link_state(&self) -> LinkState {
        self.inner.lock().await.state
    }

    pub async fn control(&self) -> ControlState {
        self.inner.lock().await.control
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.state == LinkState::Authenticated
    }

    pub async fn set_connecting(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = LinkState::Connecting;
        inner.sink = None;
    }

    pub async fn set_connected(&self, sink: WsSink) {
        let mut inner = self.inner.lock().await;
        inner.state = LinkState::Connected;
        inner.sink = Some(sink);
    }

    pub async fn set_authenticated(&self) {
        let mut inner = self.inner.lock().await;
        if inner.sink.is_some() {
            inner.state = LinkState::Authenticated;
        }
    }

    pub async fn set_disconnected(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = LinkState::Disconnected;
        inner.sink = None;
    }

    /// Apply a remote command to the control state and return the result.
    /// `kick` leaves the state untouched; the caller terminates instead.
    pub async fn apply_command(&self, action: CommandAction) -> ControlState {
        let mut inner = self.inner.lock().await;
        inner.control = match action {
            CommandAction::Stop => ControlState::Suspended,
            CommandAction::Pause => inner.control.max(ControlState::Paused),
            CommandAction::Start | CommandAction::Resume => ControlState::Mining,
            CommandAction::Kick => inner.control,
        };
        info!("Control state now {:?} after {:?}", inner.control, action);
        inner.control
    }

    /// Send on the raw connection, authenticated or not. Used for the auth
    /// handshake itself.
    pub async fn send_raw(&self, message: &RelayRequest) -> Result<()> {
        let mut inner = self.inner.lock().await;
        Self::send_locked(&mut inner, message).await
    }

    /// Send only while authenticated; the caller decides whether a refusal
    /// means "queue it" or "drop it".
    pub async fn send(&self, message: &RelayRequest) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != LinkState::Authenticated {
            return Err("relay link is not authenticated".into());
        }
        Self::send_locked(&mut inner, message).await
    }

    async fn send_locked(inner: &mut LinkInner, message: &RelayRequest) -> Result<()> {
        let text = message.to_text()?;
        let sink = inner
            .sink
            .as_mut()
            .ok_or("relay link is down")?;
        match sink.send(Message::Text(text)).await {
            Ok(()) => {
                debug!("Relay send ok");
                Ok(())
            }
            Err(e) => {
                // A failed send is a connection error; the reconnect loop
                // picks the pieces up.
                inner.state = LinkState::Disconnected;
                inner.sink = None;
                Err(Box::new(e))
            }
        }
    }
}

impl Default for UpstreamLink {
    fn default() -> Self {
        Self::new()
    }
}


// Changelog:
// - v1.1.0 (2025-07-30): Fold control state into the link unit so commands
//   and reconnect transitions share one critical section.
// - v1.0.0 (2025-07-12): Initial link handle.
