// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/upstream/queue.rs
// Version: 1.0.0
//
// This file implements the pending share queue for the XMRig Bridge, located
// in the upstream subdirectory. Shares submitted while the relay link is
// unusable park here and are delivered, in order, once the link
// re-authenticates.
//
// Tree Location:
// - src/upstream/queue.rs (pending share buffer)
// - Depends on: std

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::upstream::messages::RelayRequest;

/// FIFO buffer of not-yet-delivered relay messages.
///
/// Critical-section contract: every operation takes the lock for a single
/// push or pop; producers (miner connections) only append, the single
/// consumer (the upstream manager's drain) pops from the front and returns
/// a failed message to the front. Delivery order therefore always equals
/// submission order.
pub struct PendingShareQueue {
    messages: Mutex<VecDeque<RelayRequest>>,
}

impl PendingShareQueue {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a message in submission order
    pub fn push_back(&self, message: RelayRequest) {
        self.messages.lock().unwrap().push_back(message);
    }

    /// Return a message that failed to send to the head, preserving order
    pub fn requeue_front(&self, message: RelayRequest) {
        self.messages.lock().unwrap().push_front(message);
    }

    /// Take the next message to deliver
    pub fn pop_front(&self) -> Option<RelayRequest> {
        self.messages.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }
}

impl Default for PendingShareQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Share;

    fn share(n: u32) -> RelayRequest {
        RelayRequest::Submit {
            params: Share {
                job_id: format!("job-{}", n),
                nonce: format!("{:08x}", n),
                result: "00".to_string(),
            },
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = PendingShareQueue::new();
        for n in 0..5 {
            queue.push_back(share(n));
        }
        for n in 0..5 {
            assert_eq!(queue.pop_front(), Some(share(n)), "Order must be FIFO");
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_requeue_front_restores_head() {
        let queue = PendingShareQueue::new();
        queue.push_back(share(1));
        queue.push_back(share(2));

        let head = queue.pop_front().unwrap();
        queue.requeue_front(head);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front(), Some(share(1)), "Failed send returns to the head");
        assert_eq!(queue.pop_front(), Some(share(2)));
    }
}

// Changelog:
// - v1.0.0 (2025-07-12): Initial queue with the FIFO/head-requeue contract.
