// ## 📂 File: `src/queue/qp.rs`

//! queue/qp.rs
//! Queue pair state, session setup and the enqueue side.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, info};

use crate::accel::{BatchAccelerator, SoftwareManager};
use crate::config::DriverConfig;
use crate::op::CryptoOp;
use crate::queue::cache::TemplateCache;
use crate::queue::scratch::DigestScratchRing;
use crate::session::template::{Session, SessionPool};
use crate::session::types::SessionError;
use crate::session::xform::{DocsisConf, Xform};
use crate::telemetry::{QueueStats, StatsSnapshot};
use crate::types::DriverError;

static NEXT_CTX_ID: AtomicU64 = AtomicU64::new(1);

pub struct QueuePair<A: BatchAccelerator = SoftwareManager> {
    pub(super) id: u16,
    pub(super) ctx_id: u64,
    pub(super) config: DriverConfig,
    pub(super) mgr: A,
    pub(super) ingress_tx: Sender<Box<CryptoOp>>,
    pub(super) ingress_rx: Receiver<Box<CryptoOp>>,
    pub(super) scratch: DigestScratchRing,
    pub(super) cache: TemplateCache,
    pub(super) pool: Arc<SessionPool>,
    /// Finished operations that did not fit the caller's last dequeue.
    pub(super) ready: VecDeque<Box<CryptoOp>>,
    pub(super) stats: QueueStats,
}

impl<A: BatchAccelerator> std::fmt::Debug for QueuePair<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuePair")
            .field("id", &self.id)
            .field("ctx_id", &self.ctx_id)
            .field("pending", &self.ingress_rx.len())
            .field("ready", &self.ready.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl QueuePair<SoftwareManager> {
    /// Queue pair backed by the software accelerator with its own session pool.
    pub fn software(id: u16, config: DriverConfig) -> Result<Self, DriverError> {
        let mgr = SoftwareManager::new(config.accel_lanes, config.accel_slots);
        let pool = Arc::new(SessionPool::new(config.session_pool_size));
        Self::new(id, config, mgr, pool)
    }
}

impl<A: BatchAccelerator> QueuePair<A> {
    pub fn new(id: u16, config: DriverConfig, mgr: A, pool: Arc<SessionPool>) -> Result<Self, DriverError> {
        config.validate()?;
        let (ingress_tx, ingress_rx) = bounded(config.ingress_capacity);
        let ctx_id = NEXT_CTX_ID.fetch_add(1, Ordering::Relaxed);
        info!(id, ctx_id, burst = config.max_burst_size, "queue pair created");
        Ok(Self {
            id,
            ctx_id,
            scratch: DigestScratchRing::new(config.digest_ring_size),
            cache: TemplateCache::new(config.template_cache_size),
            config,
            mgr,
            ingress_tx,
            ingress_rx,
            pool,
            ready: VecDeque::new(),
            stats: QueueStats::default(),
        })
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Processing context this queue pair registers templates under.
    pub fn ctx_id(&self) -> u64 {
        self.ctx_id
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn mgr(&self) -> &A {
        &self.mgr
    }

    pub fn mgr_mut(&mut self) -> &mut A {
        &mut self.mgr
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::from(self.id, &self.stats)
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Operations waiting in the ingress ring.
    pub fn pending(&self) -> usize {
        self.ingress_rx.len()
    }

    /// Compile `chain` on this context.
    pub fn create_session(&mut self, chain: &[Xform]) -> Result<Arc<Session>, SessionError> {
        Session::configure(chain, &mut self.mgr, self.ctx_id).map(Arc::new)
    }

    pub fn create_docsis_session(&mut self, conf: &DocsisConf) -> Result<Arc<Session>, SessionError> {
        Session::configure_docsis(conf, &mut self.mgr, self.ctx_id).map(Arc::new)
    }

    /// Drop this context's copy of `sess` and zero it if nothing else holds it.
    pub fn clear_session(&mut self, sess: Arc<Session>) {
        self.cache.evict(sess.version);
        match Arc::try_unwrap(sess) {
            Ok(mut s) => s.clear(),
            Err(shared) => {
                debug!(refs = Arc::strong_count(&shared), "session still referenced, keys wiped on last drop");
            }
        }
    }

    /// Push `ops` onto the ingress ring. Accepted operations are moved out;
    /// the ones that did not fit stay in `ops`.
    pub fn enqueue_burst(&mut self, ops: &mut Vec<Box<CryptoOp>>) -> usize {
        let mut accepted = 0;
        let mut rejected = Vec::new();
        for op in ops.drain(..) {
            match self.ingress_tx.try_send(op) {
                Ok(()) => accepted += 1,
                Err(TrySendError::Full(op)) | Err(TrySendError::Disconnected(op)) => rejected.push(op),
            }
        }
        if !rejected.is_empty() {
            debug!(accepted, rejected = rejected.len(), "ingress ring full");
        }
        self.stats.add_enqueued(accepted, rejected.len());
        *ops = rejected;
        accepted
    }
}
