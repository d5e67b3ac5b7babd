// ## 📂 File: `src/session/template.rs`

//! session/template.rs
//! Job template, compiled session and the session-less slot pool.
//!
//! Design notes:
//! - A compiled `Session` is read-only; processing contexts copy its template.
//! - `version` is unique per compilation, so a context can tell a cached copy
//!   of an older session apart from the current one.
//! - `clear` drops the session's key references; the key containers wipe
//!   themselves once the last in-flight job releases them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use tracing::{debug, error, instrument};

use crate::accel::BatchAccelerator;
use crate::job::types::{ChainOrder, CipherDirection, CipherMode, HashAlg};
use crate::session::aead::compile_aead;
use crate::session::auth::compile_auth;
use crate::session::cipher::compile_cipher;
use crate::session::docsis::compile_docsis_params;
use crate::session::keys::SessionKeys;
use crate::session::mode::ChainMode;
use crate::session::types::{SessionError, SessionParams};
use crate::session::xform::{DocsisConf, Xform};
use crate::session::SessionDraft;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Pre-validated job skeleton.
#[derive(Clone, Debug, Default)]
pub struct JobTemplate {
    pub cipher_mode: CipherMode,
    pub hash_alg: HashAlg,
    pub chain_order: ChainOrder,
    pub cipher_direction: CipherDirection,
    pub key_len: u16,
    pub iv_len: u16,
    pub auth_tag_output_len: u16,
    /// AAD length for CCM / GCM / ChaCha20-Poly1305.
    pub aad_len: u16,
    pub gmac_iv_len: u16,
    pub keys: Arc<SessionKeys>,
    /// Id returned by the accelerator's `set_session`.
    pub session_id: u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionKind {
    #[default]
    Crypto,
    /// DOCSIS lookaside protocol.
    Security,
}

#[derive(Debug, Default)]
pub struct Session {
    pub params: SessionParams,
    pub template: JobTemplate,
    pub kind: SessionKind,
    /// Processing context the template was last synchronized with.
    pub owner: u64,
    pub version: u64,
    active: bool,
}

impl Session {
    fn from_draft(draft: SessionDraft, kind: SessionKind) -> Self {
        let SessionDraft { mut template, params, keys } = draft;
        template.keys = Arc::new(keys);
        Self {
            params,
            template,
            kind,
            owner: 0,
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
            active: true,
        }
    }

    /// Compile `chain` and register the template with `mgr` on context `ctx`.
    pub fn configure<A: BatchAccelerator + ?Sized>(chain: &[Xform], mgr: &mut A, ctx: u64) -> Result<Self, SessionError> {
        let mut s = compile(chain)?;
        s.attach(mgr, ctx);
        Ok(s)
    }

    pub fn configure_docsis<A: BatchAccelerator + ?Sized>(
        conf: &DocsisConf,
        mgr: &mut A,
        ctx: u64,
    ) -> Result<Self, SessionError> {
        let mut s = compile_docsis(conf)?;
        s.attach(mgr, ctx);
        Ok(s)
    }

    fn attach<A: BatchAccelerator + ?Sized>(&mut self, mgr: &mut A, ctx: u64) {
        self.template.session_id = mgr.set_session(&self.template);
        self.owner = ctx;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_security(&self) -> bool {
        self.kind == SessionKind::Security
    }

    /// Zero the session. Keys are released and the template becomes unusable.
    pub fn clear(&mut self) {
        self.template = JobTemplate::default();
        self.params = SessionParams::default();
        self.kind = SessionKind::Crypto;
        self.owner = 0;
        self.version = 0;
        self.active = false;
    }
}

/// Compile a symmetric transform chain.
#[instrument(level = "debug", skip(chain), fields(xforms = chain.len()))]
pub fn compile(chain: &[Xform]) -> Result<Session, SessionError> {
    let mode = ChainMode::parse(chain).map_err(|e| {
        error!(error = %e, "unsupported operation chain order parameter");
        e
    })?;

    let mut draft = SessionDraft::default();
    draft.template.chain_order = mode.chain_order();
    draft.template.iv_len = 0;

    compile_auth(mode.auth(), &mut draft).map_err(|e| {
        error!(error = %e, "invalid/unsupported authentication parameters");
        e
    })?;
    compile_cipher(mode.cipher(), &mut draft).map_err(|e| {
        error!(error = %e, "invalid/unsupported cipher parameters");
        e
    })?;
    if let Some(aead) = mode.aead() {
        compile_aead(aead, &mut draft).map_err(|e| {
            error!(error = %e, "invalid/unsupported aead parameters");
            e
        })?;
    }

    let s = Session::from_draft(draft, SessionKind::Crypto);
    debug!(
        cipher = ?s.template.cipher_mode,
        hash = ?s.template.hash_alg,
        order = ?s.template.chain_order,
        tag_len = s.template.auth_tag_output_len,
        version = s.version,
        "session compiled"
    );
    Ok(s)
}

/// Compile a DOCSIS security session.
#[instrument(level = "debug", skip(conf), fields(direction = ?conf.direction))]
pub fn compile_docsis(conf: &DocsisConf) -> Result<Session, SessionError> {
    let mut draft = SessionDraft::default();
    compile_docsis_params(conf, &mut draft).map_err(|e| {
        error!(error = %e, "unsupported DOCSIS security configuration");
        e
    })?;
    Ok(Session::from_draft(draft, SessionKind::Security))
}

/// Bounded pool of session slots for session-less operations.
pub struct SessionPool {
    slots: ArrayQueue<Box<Session>>,
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionPool({}/{} free)", self.slots.len(), self.slots.capacity())
    }
}

impl SessionPool {
    pub fn new(size: usize) -> Self {
        let slots = ArrayQueue::new(size.max(1));
        for _ in 0..size {
            let _ = slots.push(Box::<Session>::default());
        }
        Self { slots }
    }

    pub fn take(&self) -> Option<Box<Session>> {
        self.slots.pop()
    }

    /// Zero the slot and return it.
    pub fn put(&self, mut slot: Box<Session>) {
        slot.clear();
        if self.slots.push(slot).is_err() {
            debug!("session pool full, dropping slot");
        }
    }

    pub fn available(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }
}
