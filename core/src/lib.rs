//! mb-offload-core
//!
//! Pure Rust session compiler and job batching engine for a multi-buffer
//! symmetric crypto accelerator.
//! No FFI, no unsafe.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;
pub mod capabilities;

// Buffers, primitives and operations
pub mod mbuf;
pub mod crypto;
pub mod op;

// Session compiler and job engine
pub mod session;
pub mod job;
pub mod accel;
pub mod queue;
pub mod bulk;

pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::accel::{BatchAccelerator, SoftwareManager};
    pub use crate::bulk::{process_bulk, BulkElem, BulkStatus, HeadTail, SymOfs};
    pub use crate::capabilities::{FeatureFlags, DEVICE_FEATURES};
    pub use crate::config::DriverConfig;
    pub use crate::mbuf::{BufHandle, BufPtr, Mbuf};
    pub use crate::op::{CryptoOp, DataRegion, OpSession, OpStatus};
    pub use crate::queue::QueuePair;
    pub use crate::session::template::{Session, SessionPool};
    pub use crate::session::types::SessionError;
    pub use crate::session::xform::{
        AeadAlgo, AeadOp, AuthAlgo, AuthOp, CipherAlgo, CipherOp, DocsisConf, DocsisDirection, IvParam, Xform,
    };
    pub use crate::telemetry::{QueueStats, StatsSnapshot};
    pub use crate::types::DriverError;
}
