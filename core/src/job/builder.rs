// ## 📂 File: `src/job/builder.rs`

//! job/builder.rs
//! Operation → job translation.
//!
//! Design notes:
//! - Each job starts from the session template, copied again through the
//!   per-context cache when the session was synchronized elsewhere.
//! - Digests that cannot be written in place go to the scratch ring; the
//!   ring index is local to a build round and committed by the caller.
//! - On failure the operation is handed back with the error; the caller
//!   turns it into a NULL job so it still completes through the accelerator.

use tracing::{trace, warn};

use crate::accel::BatchAccelerator;
use crate::constants::{CCM_AAD_OFFSET, CCM_IV_OFFSET};
use crate::job::layout::{auth_start_offset, digest_appended_in_src, dst_offset, HashStart};
use crate::job::sgl::{handle_sgl_linear, multi_sgl_job, sgl_parts, single_sgl_job};
use crate::job::types::{
    is_aead_algo, ChainOrder, CipherDirection, CipherMode, Extent, HashAlg, Job, SglContext,
};
use crate::job::JobError;
use crate::mbuf::BufPtr;
use crate::op::{CryptoOp, OpSession};
use crate::queue::cache::TemplateCache;
use crate::queue::scratch::DigestScratchRing;
use crate::session::template::{JobTemplate, Session, SessionPool};
use crate::session::types::SessionParams;
use crate::telemetry::QueueStats;
use crate::utils::bits_to_bytes;

/// Queue-pair state borrowed for one build round.
pub struct BuildCtx<'a, A: BatchAccelerator + ?Sized> {
    pub mgr: &'a mut A,
    pub ctx_id: u64,
    pub scratch: &'a DigestScratchRing,
    /// Local scratch index, committed after submission.
    pub digest_idx: usize,
    pub cache: &'a mut TemplateCache,
    pub pool: &'a SessionPool,
    pub max_sgl_segs: usize,
    /// Jobs handed back while SGL sub-jobs were being submitted.
    pub early: Vec<Job>,
    /// Counter deltas for this round.
    pub stats: QueueStats,
}

impl<'a, A: BatchAccelerator + ?Sized> BuildCtx<'a, A> {
    fn next_scratch(&mut self) -> BufPtr {
        let (ptr, next) = self.scratch.slot(self.digest_idx);
        self.digest_idx = next;
        self.stats.digest_redirects += 1;
        ptr
    }

    /// Session template valid on this context.
    fn template_for(&mut self, sess: &Session) -> JobTemplate {
        if sess.owner == self.ctx_id {
            sess.template.clone()
        } else {
            self.cache.resolve(sess, &mut *self.mgr)
        }
    }

    fn switch_to_sgl(&mut self, job: &mut Job, cipher: CipherMode, hash: HashAlg) {
        job.tmpl.cipher_mode = cipher;
        job.tmpl.hash_alg = hash;
        job.sgl_ctx = Some(SglContext::default());
        job.tmpl.session_id = self.mgr.set_session(&job.tmpl);
    }
}

/// An operation that could not be turned into a job.
#[derive(Debug)]
pub struct BuildFailure {
    pub op: Box<CryptoOp>,
    pub error: JobError,
}

/// Build the job for `op`: crypto or DOCSIS security path.
pub fn build_job<A: BatchAccelerator + ?Sized>(
    op: Box<CryptoOp>,
    cx: &mut BuildCtx<'_, A>,
) -> Result<Job, BuildFailure> {
    if let Err(error) = check_regions(&op) {
        return Err(BuildFailure { op, error });
    }
    if op.is_security() {
        set_sec_job_params(op, cx)
    } else {
        set_job_params(op, cx)
    }
}

/// Every region must end inside the 32-bit offset space.
fn check_regions(op: &CryptoOp) -> Result<(), JobError> {
    for (name, region) in [("cipher", op.cipher), ("auth", op.auth), ("aead", op.aead)] {
        if region.end().is_none() {
            warn!(region = name, offset = region.offset, length = region.length, "region overflows");
            return Err(JobError::RegionOverflow(name));
        }
    }
    Ok(())
}

/// NULL/NULL hash-then-cipher decrypt job carrying `op`.
pub fn set_job_null_op(op: Box<CryptoOp>) -> Job {
    let mut job = Job::default();
    job.tmpl.chain_order = ChainOrder::HashCipher;
    job.tmpl.cipher_mode = CipherMode::Null;
    job.tmpl.hash_alg = HashAlg::Null;
    job.tmpl.cipher_direction = CipherDirection::Decrypt;
    job.user_data = Some(op);
    job
}

fn resolve_session<A: BatchAccelerator + ?Sized>(
    op: &mut CryptoOp,
    cx: &mut BuildCtx<'_, A>,
) -> Result<(JobTemplate, SessionParams), JobError> {
    let slot = match &op.session {
        OpSession::Session(s) => {
            if !s.is_active() {
                return Err(JobError::InvalidSession);
            }
            return Ok((cx.template_for(s), s.params));
        }
        OpSession::Sessionless(chain) => {
            let mut slot = cx.pool.take().ok_or(JobError::PoolExhausted)?;
            match Session::configure(chain, &mut *cx.mgr, cx.ctx_id) {
                Ok(s) => *slot = s,
                Err(e) => {
                    cx.pool.put(slot);
                    return Err(e.into());
                }
            }
            slot
        }
        OpSession::Security(_) | OpSession::None => return Err(JobError::InvalidSession),
    };
    let out = (slot.template.clone(), slot.params);
    op.sessionless_slot = Some(slot);
    Ok(out)
}

fn set_job_params<A: BatchAccelerator + ?Sized>(
    mut op: Box<CryptoOp>,
    cx: &mut BuildCtx<'_, A>,
) -> Result<Job, BuildFailure> {
    let (tmpl, params) = match resolve_session(&mut op, cx) {
        Ok(v) => v,
        Err(error) => return Err(BuildFailure { op, error }),
    };
    let mut job = Job::from_template(&tmpl);
    job.sess = params;

    match fill_job(&mut job, &op, cx) {
        Ok(()) => {
            job.user_data = Some(op);
            Ok(job)
        }
        Err(error) => Err(BuildFailure { op, error }),
    }
}

fn apply_hash_start(job: &mut Job, hs: HashStart) {
    job.hash_src = hs.base;
    job.hash_start_offset = hs.offset;
}

fn fill_job<A: BatchAccelerator + ?Sized>(
    job: &mut Job,
    op: &CryptoOp,
    cx: &mut BuildCtx<'_, A>,
) -> Result<(), JobError> {
    let m_src = &op.m_src;
    if m_src.nb_segs() == 0 {
        return Err(JobError::InvalidSource);
    }
    let oop = op.is_out_of_place();
    let m_dst = if oop { op.dst_mbuf() } else { m_src };
    let cipher_mode = job.tmpl.cipher_mode;
    let params = job.sess;

    let sgl = m_src.nb_segs() > 1 || m_dst.nb_segs() > 1;
    let lb_sgl = sgl && !cipher_mode.supports_native_sgl();

    if cipher_mode == CipherMode::Gcm {
        return set_gcm_job(job, sgl, op, oop, cx);
    }

    let aead = is_aead_algo(job.tmpl.hash_alg, cipher_mode);

    match job.tmpl.hash_alg {
        HashAlg::AesCcm => job.aad = op.aad.as_ref().map(|a| a.add(CCM_AAD_OFFSET)),
        HashAlg::AesGmac => {
            job.aad = op.aad.clone();
            if sgl {
                cx.switch_to_sgl(job, CipherMode::GcmSgl, HashAlg::GcmSgl);
            }
        }
        HashAlg::AesGmac128
        | HashAlg::AesGmac192
        | HashAlg::AesGmac256
        | HashAlg::ZucEia3Bitlen
        | HashAlg::Zuc256Eia3Bitlen
        | HashAlg::Snow3gUia2Bitlen => job.auth_iv = Some(op.priv_ptr(params.auth_iv_offset as usize)),
        HashAlg::Chacha20Poly1305 => {
            job.aad = op.aad.clone();
            if sgl {
                cx.switch_to_sgl(job, CipherMode::Chacha20Poly1305Sgl, HashAlg::Chacha20Poly1305Sgl);
            }
        }
        HashAlg::Sm4Gcm => job.aad = op.aad.clone(),
        _ => {}
    }

    let m_offset = dst_offset(op, cipher_mode, aead);

    // Digest output location.
    if job.tmpl.hash_alg != HashAlg::Null && params.is_verify() {
        job.auth_tag_output = Some(cx.next_scratch());
    } else {
        job.auth_tag_output = if aead {
            op.aead_digest.clone()
        } else {
            digest_appended_in_src(op, &job.tmpl, oop).or_else(|| op.auth_digest.clone())
        };
        // The accelerator only emits truncated or full digests.
        if params.req_digest_len != job.tmpl.auth_tag_output_len {
            job.auth_tag_output = Some(cx.next_scratch());
        }
    }

    if sgl {
        job.src = None;
        job.dst = None;
    } else {
        job.src = m_src.mtod();
        job.dst = m_dst.mtod_offset(m_offset);
    }

    let (a, au, c) = (op.aead, op.auth, op.cipher);
    let iv = op.priv_ptr(params.iv.offset as usize);
    let order = job.tmpl.chain_order;

    match job.tmpl.hash_alg {
        HashAlg::AesCcm => {
            job.hash_start_offset = a.offset as u64;
            job.msg_len_to_hash = Extent::Bytes(a.length as u64);
            job.iv = Some(iv.add(CCM_IV_OFFSET));
        }
        HashAlg::AesGmac | HashAlg::Chacha20Poly1305 => {
            job.hash_start_offset = a.offset as u64;
            job.msg_len_to_hash = Extent::Bytes(a.length as u64);
            job.iv = Some(iv);
        }
        HashAlg::AesGmac128 | HashAlg::AesGmac192 | HashAlg::AesGmac256 => {
            job.hash_start_offset = au.offset as u64;
            job.msg_len_to_hash = Extent::Bytes(au.length as u64);
        }
        HashAlg::GcmSgl | HashAlg::Chacha20Poly1305Sgl => {
            job.hash_start_offset = 0;
            job.msg_len_to_hash = Extent::Bytes(0);
            job.iv = Some(iv);
        }
        // Offset in bytes, length in bits.
        HashAlg::ZucEia3Bitlen | HashAlg::Zuc256Eia3Bitlen | HashAlg::Snow3gUia2Bitlen => {
            let hs = auth_start_offset(
                op,
                order,
                oop,
                lb_sgl,
                (bits_to_bytes(au.offset), bits_to_bytes(au.length)),
                (bits_to_bytes(c.offset), bits_to_bytes(c.length)),
            )?;
            apply_hash_start(job, hs);
            job.msg_len_to_hash = Extent::Bits(au.length as u64);
            job.iv = Some(iv);
        }
        HashAlg::KasumiUia1 => {
            let hs = auth_start_offset(
                op,
                order,
                oop,
                lb_sgl,
                (bits_to_bytes(au.offset), bits_to_bytes(au.length)),
                (bits_to_bytes(c.offset), bits_to_bytes(c.length)),
            )?;
            apply_hash_start(job, hs);
            job.msg_len_to_hash = Extent::Bytes(bits_to_bytes(au.length));
            job.iv = Some(iv);
        }
        HashAlg::Sm4Gcm => {
            job.hash_start_offset = 0;
            if let Some(src) = job.src.as_mut() {
                src.offset += a.offset as usize;
            }
            job.msg_len_to_hash = Extent::Bytes(a.length as u64);
            job.iv = Some(iv);
        }
        _ => {
            let hs = auth_start_offset(
                op,
                order,
                oop,
                lb_sgl,
                (au.offset as u64, au.length as u64),
                (c.offset as u64, c.length as u64),
            )?;
            apply_hash_start(job, hs);
            job.msg_len_to_hash = Extent::Bytes(au.length as u64);
            job.iv = Some(iv);
        }
    }

    match job.tmpl.cipher_mode {
        CipherMode::ZucEea3 => {
            job.cipher_start = Extent::Bytes(bits_to_bytes(c.offset));
            job.msg_len_to_cipher = Extent::Bytes(bits_to_bytes(c.length));
        }
        CipherMode::Snow3gUea2Bitlen | CipherMode::KasumiUea1Bitlen => {
            job.cipher_start = Extent::Bits(c.offset as u64);
            job.msg_len_to_cipher = Extent::Bits(c.length as u64);
        }
        CipherMode::Gcm | CipherMode::Ccm | CipherMode::Chacha20Poly1305 => {
            job.cipher_start = Extent::Bytes(a.offset as u64);
            job.msg_len_to_cipher = Extent::Bytes(a.length as u64);
        }
        CipherMode::GcmSgl | CipherMode::Chacha20Poly1305Sgl => {
            job.cipher_start = Extent::Bytes(0);
            job.msg_len_to_cipher = Extent::Bytes(0);
        }
        CipherMode::Sm4Gcm => job.msg_len_to_cipher = Extent::Bytes(a.length as u64),
        _ => {
            job.cipher_start = Extent::Bytes(c.offset as u64);
            job.msg_len_to_cipher = Extent::Bytes(c.length as u64);
        }
    }

    if cipher_mode == CipherMode::Null && oop && !sgl {
        let start = job.cipher_start.in_bytes() as usize;
        let len = job.msg_len_to_cipher.in_bytes() as usize;
        if let (Some(src), Some(dst)) = (m_src.mtod(), m_dst.mtod()) {
            src.add(start).copy_to(&dst.add(start), len)?;
        }
    }

    if sgl {
        if lb_sgl {
            cx.stats.sgl_linearized += 1;
            return handle_sgl_linear(job, op, m_offset, params.is_verify());
        }
        cx.stats.sgl_native += 1;
        return native_sgl(job, op, oop, m_offset, a.length as usize, cx);
    }
    Ok(())
}

fn native_sgl<A: BatchAccelerator + ?Sized>(
    job: &mut Job,
    op: &CryptoOp,
    oop: bool,
    offset: usize,
    total: usize,
    cx: &mut BuildCtx<'_, A>,
) -> Result<(), JobError> {
    let parts = sgl_parts(op, oop, offset, total)?;
    if op.m_src.nb_segs() <= cx.max_sgl_segs {
        single_sgl_job(job, parts);
    } else {
        multi_sgl_job(job, parts, &mut *cx.mgr, &mut cx.early);
    }
    Ok(())
}

fn set_gcm_job<A: BatchAccelerator + ?Sized>(
    job: &mut Job,
    sgl: bool,
    op: &CryptoOp,
    oop: bool,
    cx: &mut BuildCtx<'_, A>,
) -> Result<(), JobError> {
    let a = op.aead;
    let m_offset = a.offset as usize;

    job.aad = op.aad.clone();
    if sgl {
        cx.switch_to_sgl(job, CipherMode::GcmSgl, HashAlg::GcmSgl);
        job.hash_start_offset = 0;
        job.msg_len_to_hash = Extent::Bytes(0);
        job.msg_len_to_cipher = Extent::Bytes(0);
        job.cipher_start = Extent::Bytes(0);
    } else {
        job.hash_start_offset = a.offset as u64;
        job.msg_len_to_hash = Extent::Bytes(a.length as u64);
        job.cipher_start = Extent::Bytes(a.offset as u64);
        job.msg_len_to_cipher = Extent::Bytes(a.length as u64);
    }

    job.auth_tag_output = if job.sess.is_verify() {
        Some(cx.next_scratch())
    } else {
        op.aead_digest.clone()
    };
    job.iv = Some(op.priv_ptr(job.sess.iv.offset as usize));

    if sgl {
        job.src = None;
        job.dst = None;
        cx.stats.sgl_native += 1;
        trace!(segs = op.m_src.nb_segs(), "native GCM segment list");
        return native_sgl(job, op, oop, m_offset, a.length as usize, cx);
    }
    let m_dst = if oop { op.dst_mbuf() } else { &op.m_src };
    job.src = op.m_src.mtod();
    job.dst = m_dst.mtod_offset(m_offset);
    Ok(())
}

fn set_sec_job_params<A: BatchAccelerator + ?Sized>(
    op: Box<CryptoOp>,
    cx: &mut BuildCtx<'_, A>,
) -> Result<Job, BuildFailure> {
    let fail = |op: Box<CryptoOp>, error: JobError| Err(BuildFailure { op, error });

    let sess = match &op.session {
        OpSession::Security(s) if s.is_active() => Some(s.clone()),
        _ => None,
    };
    let Some(sess) = sess else {
        return fail(op, JobError::InvalidSession);
    };
    if sess.template.cipher_mode != CipherMode::DocsisSecBpi || sess.template.hash_alg != HashAlg::DocsisCrc32 {
        warn!(cipher = ?sess.template.cipher_mode, hash = ?sess.template.hash_alg, "only DOCSIS security sessions are supported");
        return fail(op, JobError::NotDocsis);
    }
    if op.is_out_of_place() {
        return fail(op, JobError::OutOfPlaceSecurity);
    }

    let mut job = Job::from_template(&sess.template);
    job.sess = sess.params;
    job.iv = Some(op.priv_ptr(sess.params.iv.offset as usize));
    job.auth_tag_output = Some(cx.next_scratch());

    job.src = op.m_src.mtod();
    job.dst = op.m_src.mtod_offset(op.cipher.offset as usize);
    job.cipher_start = Extent::Bytes(op.cipher.offset as u64);
    job.msg_len_to_cipher = Extent::Bytes(op.cipher.length as u64);
    job.hash_start_offset = op.auth.offset as u64;
    job.msg_len_to_hash = Extent::Bytes(op.auth.length as u64);

    job.user_data = Some(op);
    Ok(job)
}
