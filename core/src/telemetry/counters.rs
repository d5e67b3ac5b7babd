// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Queue-pair counters.
//!
//! Summary: plain `u64` fields owned by one queue pair. A build round
//! accumulates its own deltas and merges them afterwards.
use std::ops::AddAssign;

/// Counters collected by one queue pair.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued_count: u64,
    pub dequeued_count: u64,
    pub enqueue_err_count: u64,
    pub dequeue_err_count: u64,
    /// Flushes issued because a round made no progress.
    pub forced_flush_count: u64,
    /// Flushes that returned nothing while job slots were short.
    pub flush_stall_count: u64,
    pub sgl_linearized: u64,
    pub sgl_native: u64,
    /// Digests written to the scratch ring instead of the op.
    pub digest_redirects: u64,
}

impl QueueStats {
    pub fn add_enqueued(&mut self, accepted: usize, rejected: usize) {
        self.enqueued_count += accepted as u64;
        self.enqueue_err_count += rejected as u64;
    }

    pub fn add_dequeued(&mut self, n: usize) {
        self.dequeued_count += n as u64;
    }

    /// Ops that failed to build and rode a NULL job.
    pub fn add_build_error(&mut self) {
        self.dequeue_err_count += 1;
    }

    pub fn total_errors(&self) -> u64 {
        self.enqueue_err_count + self.dequeue_err_count
    }

    // Each build round owns its delta, so workers never share counters.
    pub fn merge(&mut self, other: &QueueStats) {
        self.enqueued_count += other.enqueued_count;
        self.dequeued_count += other.dequeued_count;
        self.enqueue_err_count += other.enqueue_err_count;
        self.dequeue_err_count += other.dequeue_err_count;
        self.forced_flush_count += other.forced_flush_count;
        self.flush_stall_count += other.flush_stall_count;
        self.sgl_linearized += other.sgl_linearized;
        self.sgl_native += other.sgl_native;
        self.digest_redirects += other.digest_redirects;
    }

    pub fn reset(&mut self) {
        *self = QueueStats::default();
    }
}

impl AddAssign for QueueStats {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
