// ## 📂 File: `src/queue/dequeue.rs`

//! queue/dequeue.rs
//! Build, submit and collect in bursts.
//!
//! Design notes:
//! - Work is cut into chunks of at most `max_burst_size` operations.
//! - When the accelerator is short of job slots the chunk only flushes.
//!   Consecutive flushes that return nothing are counted; after
//!   `flush_retry_limit` of them the call returns what it has.
//! - A flush is forced only while the whole call has produced no operation,
//!   so jobs parked in lanes come back even when the ingress ring is empty.
//!   Once something completed, later rounds leave the lanes alone. An idle
//!   queue pair (empty ring, nothing in flight) returns at once.
//! - Every job handed back is post-processed exactly once.

use tracing::{debug, trace, warn};

use crate::accel::BatchAccelerator;
use crate::job::{build_job, post_process_job, set_job_null_op, BuildCtx, BuildFailure, Job};
use crate::op::CryptoOp;
use crate::queue::qp::QueuePair;
use crate::telemetry::QueueStats;

impl<A: BatchAccelerator> QueuePair<A> {
    /// Process up to `nb_ops` worth of work and return finished operations.
    pub fn dequeue_burst(&mut self, nb_ops: usize) -> Vec<Box<CryptoOp>> {
        let mut out = Vec::with_capacity(nb_ops);
        if nb_ops == 0 {
            return out;
        }
        while out.len() < nb_ops {
            let Some(op) = self.ready.pop_front() else { break };
            out.push(op);
        }
        self.stats.add_dequeued(out.len());

        let burst = nb_ops.min(self.config.max_burst_size);
        let mut remaining = nb_ops - out.len();
        let mut stalls = 0u32;
        // Operations completed by this call.
        let mut processed = 0usize;

        while remaining > 0 {
            let n = remaining.min(burst);

            if self.mgr.get_next_burst(n) < n {
                let flushed = self.mgr.flush_burst(n);
                if flushed.is_empty() {
                    stalls += 1;
                    self.stats.flush_stall_count += 1;
                    if stalls >= self.config.flush_retry_limit {
                        warn!(queue = self.id, stalls, "accelerator made no progress, returning early");
                        break;
                    }
                    continue;
                }
                stalls = 0;
                let progressed = flushed.len();
                processed += self.collect(flushed, &mut out, nb_ops);
                remaining = remaining.saturating_sub(progressed);
                continue;
            }
            stalls = 0;

            processed += self.run_round(n, &mut out, nb_ops);
            if processed == 0 && self.mgr.in_flight() > 0 {
                self.stats.forced_flush_count += 1;
                let flushed = self.mgr.flush_burst(n);
                processed = self.collect(flushed, &mut out, nb_ops);
                trace!(queue = self.id, processed, "forced flush");
            }
            remaining -= n;
            if self.ingress_rx.is_empty() && (processed > 0 || self.mgr.in_flight() == 0) {
                break;
            }
        }
        out
    }

    /// Pull up to `n` operations, build and submit them.
    fn run_round(&mut self, n: usize, out: &mut Vec<Box<CryptoOp>>, cap: usize) -> usize {
        let ops: Vec<Box<CryptoOp>> = self.ingress_rx.try_iter().take(n).collect();
        let mut jobs = Vec::with_capacity(ops.len());

        let (early, delta, digest_idx) = {
            let mut cx = BuildCtx {
                mgr: &mut self.mgr,
                ctx_id: self.ctx_id,
                scratch: &self.scratch,
                digest_idx: self.scratch.index(),
                cache: &mut self.cache,
                pool: &*self.pool,
                max_sgl_segs: self.config.max_sgl_segs,
                early: Vec::new(),
                stats: QueueStats::default(),
            };
            for op in ops {
                match build_job(op, &mut cx) {
                    Ok(job) => jobs.push(job),
                    Err(BuildFailure { mut op, error }) => {
                        debug!(error = %error, "operation failed to build");
                        cx.stats.add_build_error();
                        op.status = error.op_status();
                        jobs.push(set_job_null_op(op));
                    }
                }
            }
            (cx.early, cx.stats, cx.digest_idx)
        };
        self.stats.merge(&delta);

        let mut processed = self.collect(early, out, cap);
        let submitted = jobs.len();
        let done = self.mgr.submit_burst(jobs);
        processed += self.collect(done, out, cap);
        self.scratch.commit(digest_idx);
        trace!(queue = self.id, submitted, processed, "burst submitted");
        processed
    }

    /// Post-process `jobs`; returns how many carried an operation.
    fn collect(&mut self, jobs: Vec<Job>, out: &mut Vec<Box<CryptoOp>>, cap: usize) -> usize {
        let mut n = 0;
        for job in jobs {
            let Some(op) = post_process_job(job, &self.pool) else { continue };
            n += 1;
            if out.len() < cap {
                out.push(op);
                self.stats.add_dequeued(1);
            } else {
                self.ready.push_back(op);
            }
        }
        n
    }
}
