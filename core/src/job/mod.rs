// ## 📂 File: `src/job/mod.rs`

//! Job builder and post-processing.
//!
//! Design notes:
//! - `builder` turns one operation into one job (or a short stream of SGL
//!   sub-jobs), `post` maps a completed job back onto its operation.
//! - A build failure never drops the operation: it rides a NULL job through
//!   the accelerator and comes back with its failure status.

pub mod builder;
pub mod layout;
pub mod post;
pub mod sgl;
pub mod types;

use thiserror::Error;

use crate::mbuf::BufferError;
use crate::op::OpStatus;
use crate::session::types::SessionError;

pub use builder::{build_job, set_job_null_op, BuildCtx, BuildFailure};
pub use post::post_process_job;
pub use types::*;

/// Per-operation build errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("operation has no valid session")]
    InvalidSession,

    #[error("session-less pool exhausted")]
    PoolExhausted,

    #[error("session-less configure failed: {0}")]
    Session(#[from] SessionError),

    #[error("invalid source buffer")]
    InvalidSource,

    #[error("invalid destination buffer")]
    InvalidDestination,

    #[error("security session is not AES-DOCSIS-BPI with CRC32")]
    NotDocsis,

    #[error("out-of-place DOCSIS operations are not supported")]
    OutOfPlaceSecurity,

    #[error("operation has no digest buffer")]
    MissingDigest,

    #[error("{0} region offset + length overflows")]
    RegionOverflow(&'static str),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl JobError {
    /// Status reported on the operation.
    pub fn op_status(&self) -> OpStatus {
        match self {
            JobError::InvalidSession | JobError::PoolExhausted | JobError::Session(_) => OpStatus::InvalidSession,
            JobError::RegionOverflow(_) => OpStatus::InvalidArgs,
            _ => OpStatus::Error,
        }
    }
}
