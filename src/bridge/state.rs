// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bridge/state.rs
// Version: 1.2.1
//
// This file implements the shared bridge state for the XMRig Bridge, located
// in the bridge subdirectory. One BridgeState instance is shared (Arc) by the
// stratum listener, the upstream transport manager, and the status reporter:
// it owns the job cache, the miner registry, the hashrate estimator, the
// pending share queue, the relay link, and the counters.
//
// Tree Location:
// - src/bridge/state.rs (shared state and the publish/forward paths)
// - Depends on: tokio, serde_json, crate::core, crate::upstream

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::bridge::hashrate::HashrateEstimator;
use crate::bridge::registry::MinerRegistry;
use crate::core::difficulty::target_to_difficulty;
use crate::core::types::{Job, Share};
use crate::stratum::protocol::StratumProtocol;
use crate::upstream::link::UpstreamLink;
use crate::upstream::messages::RelayRequest;
use crate::upstream::queue::PendingShareQueue;
use crate::utils::format::FormatUtils;

/// Monotonic counters shared with the status reporter
pub struct BridgeStats {
    pub shares_submitted: AtomicU64,
    pub shares_accepted: AtomicU64,
    pub jobs_received: AtomicU64,
    start_time: Instant,
}

impl BridgeStats {
    fn new() -> Self {
        Self {
            shares_submitted: AtomicU64::new(0),
            shares_accepted: AtomicU64::new(0),
            jobs_received: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Shared mutable state of the bridge, partitioned by owner. Each piece is
/// individually guarded; nothing here holds two locks at once.
pub struct BridgeState {
    jobs: Mutex<Option<Job>>,
    estimator: Mutex<HashrateEstimator>,
    pub registry: MinerRegistry,
    pub pending: PendingShareQueue,
    pub link: UpstreamLink,
    pub stats: BridgeStats,
}

impl BridgeState {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(None),
            estimator: Mutex::new(HashrateEstimator::new()),
            registry: MinerRegistry::new(),
            pending: PendingShareQueue::new(),
            link: UpstreamLink::new(),
            stats: BridgeStats::new(),
        }
    }

    /// Replace the cached job, update the estimator's difficulty, and
    /// broadcast the job to every registered miner.
    ///
    /// Jobs are replaced wholesale and never patched; readers see either
    /// the fully-old or fully-new job.
    pub async fn publish_job(&self, job: Job) {
        let difficulty = target_to_difficulty(&job.target);
        {
            let mut estimator = self.estimator.lock().unwrap();
            estimator.set_difficulty(difficulty);
        }
        self.stats.jobs_received.fetch_add(1, Ordering::Relaxed);

        let line = StratumProtocol::to_message(StratumProtocol::job_notification(&job));
        {
            let mut cached = self.jobs.lock().unwrap();
            *cached = Some(job.clone());
        }

        info!(
            "📋 New job {} (height {}, difficulty {})",
            &job.job_id[..16.min(job.job_id.len())],
            job.height,
            FormatUtils::format_number(difficulty)
        );
        self.registry.broadcast(&line).await;
    }

    /// The cached job, or the well-formed placeholder before the first
    /// real job arrives. Logins never block on the relay.
    pub fn get_or_placeholder(&self) -> Job {
        self.jobs
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(Job::placeholder)
    }

    /// Difficulty of the current job as the estimator sees it
    pub fn current_difficulty(&self) -> u64 {
        self.estimator.lock().unwrap().difficulty()
    }

    /// Current hashrate estimate, refreshed against the clock
    pub fn hashrate(&self) -> f64 {
        let mut estimator = self.estimator.lock().unwrap();
        estimator.refresh();
        estimator.rate()
    }

    /// Record a miner's share and hand it to the upstream path. The caller
    /// acknowledges the miner immediately regardless of what happens here.
    pub async fn submit_share(&self, share: Share) {
        self.stats.shares_submitted.fetch_add(1, Ordering::Relaxed);
        self.estimator.lock().unwrap().record_share();
        self.forward_or_queue(RelayRequest::Submit { params: share })
            .await;
    }

    /// Send upstream when possible; park submits otherwise.
    ///
    /// A submit bypasses the pending queue only when the queue is empty
    /// and the link is authenticated, so queued shares always go first.
    /// Transient messages (ping, status) are dropped when the link is
    /// unusable; they are never queued.
    pub async fn forward_or_queue(&self, message: RelayRequest) {
        if !message.is_submit() {
            if let Err(e) = self.link.send(&message).await {
                warn!("Dropping transient relay message: {}", e);
            }
            return;
        }

        if self.pending.is_empty() && self.link.is_authenticated().await {
            match self.link.send(&message).await {
                Ok(()) => return,
                Err(e) => warn!("Relay send failed, queueing share: {}", e),
            }
        }
        self.pending.push_back(message);
        info!("⏳ Share queued ({} pending)", self.pending.len());
    }

    /// Deliver queued shares strictly in order. Stops at the first failure
    /// and returns the failed message to the head of the queue. Called only
    /// by the upstream transport manager, right after authentication.
    pub async fn drain_pending(&self) -> usize {
        let mut delivered = 0usize;
        while let Some(message) = self.pending.pop_front() {
            match self.link.send(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Drain stopped after {} messages: {}", delivered, e);
                    self.pending.requeue_front(message);
                    break;
                }
            }
        }
        if delivered > 0 {
            info!("📤 Drained {} queued shares ({} left)", delivered, self.pending.len());
        }
        delivered
    }

    /// Counter hook for relay hash_accepted / share_result events
    pub fn record_accepted(&self) {
        self.stats.shares_accepted.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self::new()
    }
}

// Changelog:
// - v1.2.1 (2025-08-02): Cache the job before broadcasting so a miner that
//   logs in mid-broadcast cannot see the older job.
// - v1.2.0 (2025-07-30): Queue-empty check on the submit fast path; queued
//   shares can no longer be overtaken by fresh ones.
// - v1.0.0 (2025-07-12): Initial shared state.
