// ## 📂 File: `src/accel/software.rs`

//! accel/software.rs
//! Reference multi-buffer manager running every job on the CPU.
//!
//! Design notes:
//! - Models lanes: a submitted job stays in flight until `lanes` jobs are
//!   queued, then the oldest completes. Flushing completes jobs regardless.
//! - A slot is held from submission until the completed job is handed back.
//!   Slot counts are advisory: a submit past the limit is still accepted.
//! - Algorithms without a software path complete with `InvalidArgs`.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::accel::engine::execute;
use crate::accel::BatchAccelerator;
use crate::constants::{DEFAULT_ACCEL_LANES, MAX_JOBS};
use crate::job::types::{Job, JobStatus};
use crate::session::template::JobTemplate;

#[derive(Debug)]
pub struct SoftwareManager {
    lanes: usize,
    slots: usize,
    in_flight: VecDeque<Job>,
    completed: VecDeque<Job>,
    next_session_id: u64,
}

impl Default for SoftwareManager {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEL_LANES, MAX_JOBS)
    }
}

impl SoftwareManager {
    pub fn new(lanes: usize, slots: usize) -> Self {
        let slots = slots.max(1);
        Self {
            lanes: lanes.clamp(1, slots),
            slots,
            in_flight: VecDeque::new(),
            completed: VecDeque::new(),
            next_session_id: 1,
        }
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    fn free_slots(&self) -> usize {
        self.slots.saturating_sub(self.in_flight.len() + self.completed.len())
    }

    fn complete_oldest(&mut self) -> bool {
        let Some(mut job) = self.in_flight.pop_front() else {
            return false;
        };
        job.status = match execute(&job) {
            Ok(()) => JobStatus::Completed,
            Err(e) if e.is_invalid_args() => {
                debug!(error = %e, cipher = ?job.tmpl.cipher_mode, hash = ?job.tmpl.hash_alg, "job rejected");
                JobStatus::InvalidArgs
            }
            Err(e) => {
                warn!(error = %e, "job failed");
                JobStatus::InternalError
            }
        };
        self.completed.push_back(job);
        true
    }

    fn enqueue(&mut self, mut job: Job) {
        if self.free_slots() == 0 {
            // Multi-job SGL streams may take more slots than reserved.
            debug!(in_flight = self.in_flight.len(), "job slots overcommitted");
        }
        job.status = JobStatus::Pending;
        self.in_flight.push_back(job);
        while self.in_flight.len() >= self.lanes {
            self.complete_oldest();
        }
    }
}

impl BatchAccelerator for SoftwareManager {
    fn set_session(&mut self, _tmpl: &JobTemplate) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        id
    }

    fn get_next_burst(&mut self, n: usize) -> usize {
        n.min(self.free_slots())
    }

    fn submit_burst(&mut self, jobs: Vec<Job>) -> Vec<Job> {
        for job in jobs {
            self.enqueue(job);
        }
        self.completed.drain(..).collect()
    }

    fn flush_burst(&mut self, max: usize) -> Vec<Job> {
        while self.completed.len() < max && self.complete_oldest() {}
        let n = max.min(self.completed.len());
        self.completed.drain(..n).collect()
    }

    fn get_next_job(&mut self) -> Option<Job> {
        (self.free_slots() > 0).then(Job::default)
    }

    fn submit_job(&mut self, job: Job) -> Option<Job> {
        self.enqueue(job);
        self.completed.pop_front()
    }

    fn get_completed_job(&mut self) -> Option<Job> {
        self.completed.pop_front()
    }

    fn flush_job(&mut self) -> Option<Job> {
        if self.completed.is_empty() {
            self.complete_oldest();
        }
        self.completed.pop_front()
    }

    fn in_flight(&self) -> usize {
        self.in_flight.len() + self.completed.len()
    }
}
