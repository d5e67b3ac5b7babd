// # Full Implementation: `src/telemetry/` Module

// ## src/telemetry/mod.rs

//! telemetry/mod.rs
//! Queue-pair counters and immutable snapshots.
//!
//! Notes:
//! - Counters are plain fields owned by the queue pair; no atomics on the hot path.
//! - Snapshots are immutable and serializable.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
