// ## 📂 File: `src/job/post.rs`

//! job/post.rs
//! Completed job → operation status, digest verification and delivery.
//!
//! Design notes:
//! - Only operations still `NotProcessed` are touched; a status written at
//!   build time survives the NULL job unchanged.
//! - Digest comparison is constant time (`subtle`).
//! - The session-less slot goes back to the pool exactly once, after the
//!   status is final.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::constants::ETHER_CRC_LEN;
use crate::job::layout::{auth_size, cipher_size, digest_appended_in_src};
use crate::job::sgl::{post_process_sgl_linear, sgl_linear_cipher_auth_len};
use crate::job::types::{is_aead_algo, HashAlg, Job, JobStatus};
use crate::job::JobError;
use crate::mbuf::BufPtr;
use crate::op::{CryptoOp, OpStatus};
use crate::session::template::SessionPool;

/// Map a completed job back onto its operation.
///
/// Returns `None` for jobs without an operation (SGL INIT/UPDATE sub-jobs).
pub fn post_process_job(mut job: Job, pool: &SessionPool) -> Option<Box<CryptoOp>> {
    let mut op = job.take_op()?;

    if op.status == OpStatus::NotProcessed {
        if job.status == JobStatus::Completed {
            op.status = OpStatus::Success;
            if let Err(e) = finish_completed(&job, &mut op) {
                warn!(error = %e, "post-processing failed");
                op.status = OpStatus::Error;
            }
        } else {
            debug!(status = ?job.status, "job did not complete");
            op.status = OpStatus::Error;
        }
    }

    if let Some(slot) = op.sessionless_slot.take() {
        pool.put(slot);
    }
    Some(op)
}

fn finish_completed(job: &Job, op: &mut CryptoOp) -> Result<(), JobError> {
    let tmpl = &job.tmpl;
    let verify = job.sess.is_verify();

    let linear = match &job.user_data2 {
        Some(lb) if op.is_multi_segment() && !tmpl.cipher_mode.supports_native_sgl() => {
            let (mut total, _) = sgl_linear_cipher_auth_len(job);
            if !verify {
                total += tmpl.auth_tag_output_len as usize;
            }
            post_process_sgl_linear(lb, op.dst_mbuf(), total)?;
            true
        }
        _ => false,
    };

    if tmpl.hash_alg == HashAlg::Null {
        return Ok(());
    }
    let aead = is_aead_algo(tmpl.hash_alg, tmpl.cipher_mode);

    if verify {
        let matched = if aead {
            verify_digest(job, op.aead_digest.as_ref())?
        } else if op.is_security() {
            verify_docsis_sec_crc(job)?
        } else {
            verify_digest(job, op.auth_digest.as_ref())?
        };
        if !matched {
            op.status = OpStatus::AuthFailed;
        }
        return Ok(());
    }

    if op.m_src.nb_segs() == 1 && op.m_dst.is_some() && !aead {
        let oop = op.is_out_of_place();
        if digest_appended_in_src(op, tmpl, oop).is_some() {
            copy_unencrypted_digest(job, op)?;
        }
    }
    generate_digest(job, op, aead, linear)
}

/// Digest bytes past the cipher region never reached the destination.
fn copy_unencrypted_digest(job: &Job, op: &CryptoOp) -> Result<(), JobError> {
    let tmpl = &job.tmpl;
    let cipher_size = cipher_size(op, tmpl.cipher_mode);
    let auth_size = auth_size(op, tmpl.hash_alg);
    let Some(n) = (auth_size + tmpl.auth_tag_output_len as usize).checked_sub(cipher_size) else {
        return Ok(());
    };
    if let (Some(src), Some(dst)) = (op.m_src.mtod(), op.m_dst.as_ref().and_then(|d| d.mtod())) {
        src.add(cipher_size).copy_to(&dst.add(cipher_size), n)?;
    }
    Ok(())
}

/// Compare the computed tag against the operation's digest over the requested length.
pub fn verify_digest(job: &Job, digest: Option<&BufPtr>) -> Result<bool, JobError> {
    let len = job.sess.req_digest_len as usize;
    let computed = job.auth_tag_output.as_ref().ok_or(JobError::MissingDigest)?.read(len)?;
    let given = digest.ok_or(JobError::MissingDigest)?.read(len)?;
    Ok(bool::from(computed.as_slice().ct_eq(given.as_slice())))
}

/// The received CRC sits right after the hashed region.
pub fn verify_docsis_sec_crc(job: &Job) -> Result<bool, JobError> {
    if job.msg_len_to_hash.is_zero() {
        return Ok(true);
    }
    let crc_offset = (job.hash_start_offset + job.msg_len_to_hash.in_bytes())
        .checked_sub(job.cipher_start.in_bytes())
        .ok_or(JobError::InvalidDestination)?;
    let dst = job.dst.as_ref().ok_or(JobError::InvalidDestination)?;
    let received = dst.add(crc_offset as usize).read(ETHER_CRC_LEN)?;
    let computed = job.auth_tag_output.as_ref().ok_or(JobError::MissingDigest)?.read(ETHER_CRC_LEN)?;
    Ok(bool::from(computed.as_slice().ct_eq(received.as_slice())))
}

/// Deliver the requested digest length when the tag went to scratch
/// or to a linear buffer.
pub fn generate_digest(job: &Job, op: &CryptoOp, aead: bool, linear: bool) -> Result<(), JobError> {
    let req = job.sess.req_digest_len as usize;
    if !linear && req == job.tmpl.auth_tag_output_len as usize {
        return Ok(());
    }
    let dest = if aead { op.aead_digest.as_ref() } else { op.auth_digest.as_ref() };
    let Some(dest) = dest else {
        return if linear { Ok(()) } else { Err(JobError::MissingDigest) };
    };
    let tag = job.auth_tag_output.as_ref().ok_or(JobError::MissingDigest)?;
    tag.copy_to(dest, req)?;
    Ok(())
}
