// ## 📂 File: `src/accel/mod.rs`

//! accel/mod.rs
//! Batch accelerator interface consumed by the job engine.
//!
//! Design notes:
//! - Jobs move by value: submit hands a job to the manager, completion hands
//!   it back with its operation still attached.
//! - Completed jobs come back in submission order.
//! - `SoftwareManager` is the pure-Rust reference implementation.

pub mod engine;
pub mod software;

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::job::types::{CipherMode, HashAlg, Job};
use crate::mbuf::BufferError;
use crate::session::template::JobTemplate;

pub use software::SoftwareManager;

/// Per-job execution failures inside an accelerator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccelError {
    #[error("cipher mode {0:?} not supported by this accelerator")]
    UnsupportedCipher(CipherMode),

    #[error("hash algorithm {0:?} not supported by this accelerator")]
    UnsupportedHash(HashAlg),

    #[error("job is missing its {0}")]
    MissingField(&'static str),

    #[error("session holds {found} key material, expected {expected}")]
    KeyMismatch { expected: &'static str, found: &'static str },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl AccelError {
    /// Argument problems vs. failures while running the primitive.
    pub fn is_invalid_args(&self) -> bool {
        !matches!(self, AccelError::Crypto(_))
    }
}

/// Multi-buffer batch interface.
pub trait BatchAccelerator: Send {
    /// Register a template and return the id the manager uses for it.
    fn set_session(&mut self, tmpl: &JobTemplate) -> u64;

    /// Number of free job slots, capped at `n`.
    fn get_next_burst(&mut self, n: usize) -> usize;

    /// Queue `jobs`; returns the jobs that completed, oldest first.
    fn submit_burst(&mut self, jobs: Vec<Job>) -> Vec<Job>;

    /// Force completion of up to `max` jobs.
    fn flush_burst(&mut self, max: usize) -> Vec<Job>;

    /// Blank job if a slot is free.
    fn get_next_job(&mut self) -> Option<Job>;

    /// Queue one job; returns the oldest completed job, if any.
    fn submit_job(&mut self, job: Job) -> Option<Job>;

    fn get_completed_job(&mut self) -> Option<Job>;

    /// Force completion of the oldest in-flight job.
    fn flush_job(&mut self) -> Option<Job>;

    /// Jobs submitted and not yet handed back.
    fn in_flight(&self) -> usize;
}
