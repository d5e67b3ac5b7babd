// ## 📂 File: `src/config.rs`

//! config.rs
//! Queue-pair configuration.
//!
//! Design notes:
//! - Every knob has a default; a JSON document only needs the fields it changes.
//! - `validate` runs once when a queue pair is created, never on the hot path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_ACCEL_LANES, DEFAULT_FLUSH_RETRY_LIMIT, DEFAULT_INGRESS_CAPACITY, DEFAULT_SESSION_POOL_SIZE,
    DEFAULT_TEMPLATE_CACHE_SIZE, MAX_BURST_SIZE, MAX_JOBS, MAX_NUM_SEGS,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Document is not valid JSON for this shape.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A field is outside its allowed range.
    #[error("{field} = {value} outside [{min}, {max}]")]
    OutOfRange { field: &'static str, value: usize, min: usize, max: usize },
    /// Two fields contradict each other.
    #[error("inconsistent config: {0}")]
    Inconsistent(&'static str),
}

/// Tunables for one queue pair and its accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Jobs requested from the accelerator per round.
    pub max_burst_size: usize,
    /// Scratch digest slots; must cover every verify job in flight.
    pub digest_ring_size: usize,
    /// Segments carried by a single SGL job before switching to a job stream.
    pub max_sgl_segs: usize,
    pub accel_lanes: usize,
    pub accel_slots: usize,
    pub ingress_capacity: usize,
    pub session_pool_size: usize,
    /// Consecutive empty flushes tolerated before a dequeue gives up.
    pub flush_retry_limit: u32,
    pub template_cache_size: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_burst_size: MAX_BURST_SIZE,
            digest_ring_size: MAX_JOBS,
            max_sgl_segs: MAX_NUM_SEGS,
            accel_lanes: DEFAULT_ACCEL_LANES,
            accel_slots: MAX_JOBS,
            ingress_capacity: DEFAULT_INGRESS_CAPACITY,
            session_pool_size: DEFAULT_SESSION_POOL_SIZE,
            flush_retry_limit: DEFAULT_FLUSH_RETRY_LIMIT,
            template_cache_size: DEFAULT_TEMPLATE_CACHE_SIZE,
        }
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

impl DriverConfig {
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: DriverConfig = serde_json::from_str(doc).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("max_burst_size", self.max_burst_size, 1, MAX_BURST_SIZE)?;
        check_range("max_sgl_segs", self.max_sgl_segs, 1, MAX_NUM_SEGS)?;
        check_range("accel_slots", self.accel_slots, 1, usize::MAX)?;
        check_range("accel_lanes", self.accel_lanes, 1, self.accel_slots)?;
        check_range("digest_ring_size", self.digest_ring_size, 1, usize::MAX)?;
        check_range("ingress_capacity", self.ingress_capacity, 1, usize::MAX)?;
        check_range("template_cache_size", self.template_cache_size, 1, usize::MAX)?;
        check_range("flush_retry_limit", self.flush_retry_limit as usize, 1, usize::MAX)?;

        // A verify job holds its scratch slot until post-processing.
        if self.digest_ring_size < self.accel_slots {
            return Err(ConfigError::Inconsistent("digest_ring_size smaller than accel_slots"));
        }
        Ok(())
    }
}
