// ## 📂 File: `src/types.rs`

use thiserror::Error;

use crate::{
    accel::AccelError,
    config::ConfigError,
    crypto::CryptoError,
    job::JobError,
    mbuf::BufferError,
    session::types::SessionError,
};

/// Unified driver error covering configuration, session, job, accelerator,
/// buffer and crypto failures.
/// - `#[from]` conversions let `?` cross module boundaries.
/// - Per-operation failures never surface here; they land in the op status.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Queue-pair configuration rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Transform chain rejected at session compile time.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Job could not be built.
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// Accelerator refused or failed a job.
    #[error("accelerator error: {0}")]
    Accel(#[from] AccelError),

    /// Buffer access out of range.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Cryptographic primitive failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Generic validation with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
