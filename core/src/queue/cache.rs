// ## 📂 File: `src/queue/cache.rs`

//! queue/cache.rs
//! Per-context copies of session templates.
//!
//! Design notes:
//! - A session compiled on another context is re-registered with this
//!   context's accelerator once and reused afterwards.
//! - Keyed by session version: a reconfigured session never hits a stale copy.
//! - FIFO eviction once `capacity` entries are held.

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::accel::BatchAccelerator;
use crate::session::template::{JobTemplate, Session};

#[derive(Debug)]
pub struct TemplateCache {
    entries: HashMap<u64, JobTemplate>,
    order: VecDeque<u64>,
    capacity: usize,
}

impl TemplateCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Template for `sess` registered with `mgr`.
    pub fn resolve<A: BatchAccelerator + ?Sized>(&mut self, sess: &Session, mgr: &mut A) -> JobTemplate {
        if let Some(t) = self.entries.get(&sess.version) {
            return t.clone();
        }

        let mut tmpl = sess.template.clone();
        tmpl.session_id = mgr.set_session(&tmpl);
        trace!(version = sess.version, session_id = tmpl.session_id, "template synchronized");

        while self.entries.len() >= self.capacity {
            let Some(old) = self.order.pop_front() else { break };
            self.entries.remove(&old);
        }
        self.entries.insert(sess.version, tmpl.clone());
        self.order.push_back(sess.version);
        tmpl
    }

    pub fn evict(&mut self, version: u64) -> bool {
        self.order.retain(|v| *v != version);
        self.entries.remove(&version).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
