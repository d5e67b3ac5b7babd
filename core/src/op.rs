// ## 📂 File: `src/op.rs`

//! op.rs
//! Symmetric crypto operation as submitted by the application.
//!
//! Design notes:
//! - Regions are in bytes except for ZUC, SNOW3G and KASUMI, where the
//!   client gives bits. The job builder converts.
//! - The private side area (`priv_area`) holds IVs at the offsets recorded
//!   in the session.
//! - A session-less operation keeps its private session slot in the op
//!   until post-processing returns it to the pool.

use std::sync::Arc;

use crate::mbuf::{BufHandle, BufPtr, Mbuf};
use crate::session::template::Session;
use crate::session::xform::Xform;

/// Default size of the per-operation side area.
pub const OP_PRIV_SIZE: usize = 64;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OpStatus {
    #[default]
    NotProcessed,
    Success,
    AuthFailed,
    InvalidSession,
    InvalidArgs,
    Error,
}

/// `(offset, length)` of one processed region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DataRegion {
    pub offset: u32,
    pub length: u32,
}

impl DataRegion {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// First byte (or bit) past the region; `None` when it does not fit in `u32`.
    pub fn end(&self) -> Option<u32> {
        self.offset.checked_add(self.length)
    }
}

#[derive(Clone, Debug, Default)]
pub enum OpSession {
    #[default]
    None,
    Session(Arc<Session>),
    /// Transform chain compiled into a pool slot at dequeue time.
    Sessionless(Vec<Xform>),
    /// DOCSIS lookaside-protocol session.
    Security(Arc<Session>),
}

#[derive(Debug, Default)]
pub struct CryptoOp {
    pub session: OpSession,
    pub m_src: Mbuf,
    pub m_dst: Option<Mbuf>,
    pub cipher: DataRegion,
    pub auth: DataRegion,
    pub aead: DataRegion,
    pub aad: Option<BufPtr>,
    pub auth_digest: Option<BufPtr>,
    pub aead_digest: Option<BufPtr>,
    pub priv_area: BufHandle,
    pub status: OpStatus,
    /// Pool slot of a session-less op, held until post-processing.
    pub(crate) sessionless_slot: Option<Box<Session>>,
}

impl CryptoOp {
    pub fn new(session: OpSession, m_src: Mbuf) -> Self {
        Self {
            session,
            m_src,
            priv_area: BufHandle::zeroed(OP_PRIV_SIZE),
            ..Default::default()
        }
    }

    pub fn with_dst(mut self, m_dst: Mbuf) -> Self {
        self.m_dst = Some(m_dst);
        self
    }

    pub fn with_cipher(mut self, offset: u32, length: u32) -> Self {
        self.cipher = DataRegion::new(offset, length);
        self
    }

    pub fn with_auth(mut self, offset: u32, length: u32) -> Self {
        self.auth = DataRegion::new(offset, length);
        self
    }

    pub fn with_aead(mut self, offset: u32, length: u32) -> Self {
        self.aead = DataRegion::new(offset, length);
        self
    }

    pub fn with_aad(mut self, aad: BufPtr) -> Self {
        self.aad = Some(aad);
        self
    }

    pub fn with_auth_digest(mut self, digest: BufPtr) -> Self {
        self.auth_digest = Some(digest);
        self
    }

    pub fn with_aead_digest(mut self, digest: BufPtr) -> Self {
        self.aead_digest = Some(digest);
        self
    }

    /// Store `bytes` in the side area at `offset`, growing it if needed.
    pub fn with_iv(mut self, offset: u16, bytes: &[u8]) -> Self {
        let end = offset as usize + bytes.len();
        let mut area = self.priv_area.to_vec();
        if area.len() < end {
            area.resize(end, 0);
        }
        area[offset as usize..end].copy_from_slice(bytes);
        self.priv_area = BufHandle::from_vec(area);
        self
    }

    /// Address inside the side area.
    pub fn priv_ptr(&self, offset: usize) -> BufPtr {
        self.priv_area.at(offset)
    }

    /// Destination chain, or the source when processing in place.
    pub fn dst_mbuf(&self) -> &Mbuf {
        self.m_dst.as_ref().unwrap_or(&self.m_src)
    }

    pub fn is_out_of_place(&self) -> bool {
        matches!(&self.m_dst, Some(d) if !d.is_same(&self.m_src))
    }

    pub fn is_security(&self) -> bool {
        matches!(self.session, OpSession::Security(_))
    }

    pub fn is_sessionless(&self) -> bool {
        matches!(self.session, OpSession::Sessionless(_))
    }

    pub fn is_multi_segment(&self) -> bool {
        self.m_src.nb_segs() > 1 || self.m_dst.as_ref().is_some_and(|d| d.nb_segs() > 1)
    }
}
