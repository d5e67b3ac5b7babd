// ## src/telemetry/snapshot.rs

// //! src/telemetry/snapshot.rs
// //!
// //! Immutable statistics snapshot.
// //!
// //! Design notes:
// //! - `StatsSnapshot` is what leaves the queue pair; counters stay private.
// //! - Serializable so operators can dump it as JSON.

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::QueueStats;

/// Point-in-time copy of a queue pair's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub queue_id: u16,
    pub enqueued_count: u64,
    pub dequeued_count: u64,
    pub enqueue_err_count: u64,
    pub dequeue_err_count: u64,
    pub forced_flush_count: u64,
    pub flush_stall_count: u64,
    pub sgl_linearized: u64,
    pub sgl_native: u64,
    pub digest_redirects: u64,
    /// Operations accepted but not yet dequeued.
    pub in_flight: u64,
}

impl StatsSnapshot {
    pub fn from(queue_id: u16, stats: &QueueStats) -> Self {
        Self {
            queue_id,
            enqueued_count: stats.enqueued_count,
            dequeued_count: stats.dequeued_count,
            enqueue_err_count: stats.enqueue_err_count,
            dequeue_err_count: stats.dequeue_err_count,
            forced_flush_count: stats.forced_flush_count,
            flush_stall_count: stats.flush_stall_count,
            sgl_linearized: stats.sgl_linearized,
            sgl_native: stats.sgl_native,
            digest_redirects: stats.digest_redirects,
            in_flight: stats.enqueued_count.saturating_sub(stats.dequeued_count),
        }
    }

    /// Every enqueued op was either dequeued or still in flight.
    pub fn sanity_check(&self) -> bool {
        self.dequeued_count <= self.enqueued_count
            && self.dequeue_err_count <= self.dequeued_count
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
