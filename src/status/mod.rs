// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/status/mod.rs
// Version: 1.1.0
//
// This file implements the periodic status reporter for the XMRig Bridge,
// located in the status subdirectory. Each tick samples temperature,
// hashrate, and the bridge counters, computes the effective status, and
// pushes a status_update upstream when the link is authenticated. Status is
// transient: a tick that cannot be delivered is skipped, never queued.
//
// Tree Location:
// - src/status/mod.rs (status computation and reporter task)
// - Submodules: temperature

pub mod temperature;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::bridge::BridgeState;
use crate::core::types::{BridgeStatus, ControlState};
use crate::upstream::messages::{RelayRequest, StatusParams};
use crate::utils::format::FormatUtils;

pub use temperature::{TempSensor, TEMP_STOP, TEMP_THROTTLE};

/// The temperature contribution to the effective status
pub fn temp_status(temperature: Option<f32>) -> BridgeStatus {
    match temperature {
        Some(t) if t >= TEMP_STOP => BridgeStatus::TempStop,
        Some(t) if t >= TEMP_THROTTLE => BridgeStatus::TempThrottle,
        _ => BridgeStatus::Mining,
    }
}

/// Effective status is the max of all contributions; precedence is the
/// variant order of BridgeStatus, not an if-chain.
pub fn effective_status(control: ControlState, temperature: Option<f32>) -> BridgeStatus {
    control.as_status().max(temp_status(temperature))
}

/// Periodic status reporter task
pub struct StatusReporter {
    state: Arc<BridgeState>,
    sensor: TempSensor,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl StatusReporter {
    pub fn new(state: Arc<BridgeState>, period: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            state,
            sensor: TempSensor::new(),
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut shutdown = self.shutdown.clone();
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    async fn tick(&mut self) {
        let temperature = self.sensor.sample();
        let control = self.state.link.control().await;
        let status = effective_status(control, temperature);
        let hashrate = self.state.hashrate();
        let active = self.state.registry.len() as u64;
        let pending = self.state.pending.len() as u64;
        let submitted = self.state.stats.shares_submitted.load(Ordering::Relaxed);
        let jobs = self.state.stats.jobs_received.load(Ordering::Relaxed);

        info!(
            "📊 {} | {} | {} | {} miners | {} jobs | {} pending | {} submitted | up {}",
            status,
            temperature
                .map(|t| format!("{:.0}°C", t))
                .unwrap_or_else(|| "no temp".to_string()),
            FormatUtils::format_hashrate(hashrate),
            active,
            jobs,
            pending,
            submitted,
            FormatUtils::format_uptime(self.state.stats.uptime())
        );

        if !self.state.link.is_authenticated().await {
            debug!("Skipping status tick: relay link not authenticated");
            return;
        }
        let update = RelayRequest::StatusUpdate {
            params: StatusParams {
                status: status.to_string(),
                temperature,
                hashrate,
                active_client_count: active,
                pending_share_count: pending,
                total_submitted: submitted,
            },
        };
        if let Err(e) = self.state.link.send(&update).await {
            debug!("Status update dropped: {}", e);
        }
    }
}


// Changelog:
// - v1.1.0 (2025-07-30): Effective status from the ordered enums.
// - v1.0.0 (2025-07-12): Initial reporter.
