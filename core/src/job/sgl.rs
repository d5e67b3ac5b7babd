// ## 📂 File: `src/job/sgl.rs`

//! job/sgl.rs
//! Multi-segment operations.
//!
//! Design notes:
//! - GCM and ChaCha20-Poly1305 run natively over `(in, out, len)` triples:
//!   one job for up to `max_segs` parts, an INIT/UPDATE.../COMPLETE stream
//!   of jobs beyond that.
//! - Everything else is linearized into a scratch buffer and scattered back
//!   to the destination chain after completion.

use tracing::{error, trace};

use crate::accel::BatchAccelerator;
use crate::job::types::{Extent, HashAlg, Job, SglIoSeg, SglState};
use crate::job::JobError;
use crate::mbuf::{BufHandle, BufPtr, Mbuf};
use crate::op::CryptoOp;

/// `(total, auth_len)` bytes a linearized job touches.
pub fn sgl_linear_cipher_auth_len(job: &Job) -> (usize, usize) {
    let cipher_len = (job.msg_len_to_cipher.in_bytes() + job.cipher_start.in_bytes()) as usize;
    let auth_len = (job.msg_len_to_hash.in_bytes() + job.hash_start_offset) as usize;
    (auth_len.max(cipher_len), auth_len)
}

/// Copy the source chain into one scratch buffer and point the job at it.
pub fn handle_sgl_linear(job: &mut Job, op: &CryptoOp, dst_offset: usize, verify: bool) -> Result<(), JobError> {
    let (total, auth_len) = sgl_linear_cipher_auth_len(job);
    let linear = BufHandle::zeroed(total + job.tmpl.auth_tag_output_len as usize);

    let data = op.m_src.to_vec();
    let copied = total.min(data.len());
    linear.write(0, &data[..copied])?;

    job.src = Some(linear.at(0));
    job.dst = Some(linear.at(dst_offset));
    job.hash_src = None;
    if job.tmpl.hash_alg == HashAlg::AesGmac {
        job.aad = Some(linear.at(0));
    }
    job.auth_tag_output = Some(if verify { linear.at(copied) } else { linear.at(auth_len) });
    job.user_data2 = Some(linear);
    trace!(total, auth_len, copied, "linearized multi-segment operation");
    Ok(())
}

/// Scatter a finished linear buffer back over the destination chain.
pub fn post_process_sgl_linear(linear: &BufHandle, dst: &Mbuf, total: usize) -> Result<(), JobError> {
    let data = linear.read(0, total.min(linear.len()))?;
    let mut pos = 0;
    for seg in dst.segments() {
        if pos >= data.len() {
            break;
        }
        let n = seg.len().min(data.len() - pos);
        seg.write(0, &data[pos..pos + n])?;
        pos += n;
    }
    Ok(())
}

/// Position inside a segment chain.
struct SegCursor<'a> {
    segs: &'a [BufHandle],
    idx: usize,
    offset: usize,
}

impl<'a> SegCursor<'a> {
    fn seek(m: &'a Mbuf, offset: usize) -> Option<Self> {
        let (idx, offset) = m.locate(offset).ok()?;
        Some(Self { segs: m.segments(), idx, offset })
    }

    fn seg(&self) -> Option<&'a BufHandle> {
        self.segs.get(self.idx)
    }

    fn ptr(&self) -> Option<BufPtr> {
        self.seg().map(|s| s.at(self.offset))
    }

    fn remaining(&self) -> usize {
        self.seg().map_or(0, |s| s.len() - self.offset)
    }

    fn advance(&mut self, n: usize) {
        if n == self.remaining() {
            self.idx += 1;
            self.offset = 0;
        } else {
            self.offset += n;
        }
    }
}

/// Split `total` bytes starting at `offset` into per-segment parts.
pub fn sgl_parts(op: &CryptoOp, oop: bool, offset: usize, total: usize) -> Result<Vec<SglIoSeg>, JobError> {
    if total == 0 {
        return Ok(Vec::new());
    }
    let mut src = SegCursor::seek(&op.m_src, offset).ok_or(JobError::InvalidSource)?;
    let mut dst = match (oop, op.m_dst.as_ref()) {
        (true, Some(m)) => Some(SegCursor::seek(m, offset).ok_or(JobError::InvalidDestination)?),
        _ => None,
    };

    let mut left = total;
    let mut parts = Vec::new();
    while left != 0 {
        let input = src.ptr().ok_or_else(|| {
            error!("invalid source buffer");
            JobError::InvalidSource
        })?;
        let data_len = src.remaining();

        let (output, part_len) = match dst.as_mut() {
            Some(d) => {
                if d.remaining() == 0 {
                    d.idx += 1;
                    d.offset = 0;
                }
                let out = d.ptr().ok_or_else(|| {
                    error!("invalid destination buffer");
                    JobError::InvalidDestination
                })?;
                let part_len = data_len.min(d.remaining()).min(left);
                d.offset += part_len;
                (out, part_len)
            }
            None => (input.clone(), data_len.min(left)),
        };

        parts.push(SglIoSeg { input, output, len: part_len });
        left -= part_len;
        src.advance(part_len);
    }
    Ok(parts)
}

/// One job carrying the whole segment list.
pub fn single_sgl_job(job: &mut Job, parts: Vec<SglIoSeg>) {
    job.sgl_state = SglState::All;
    job.sgl_io_segs = parts;
}

/// INIT and UPDATE sub-jobs go to the accelerator now; `job` becomes the
/// COMPLETE job. Jobs the accelerator hands back meanwhile land in `early`.
pub fn multi_sgl_job<A: BatchAccelerator + ?Sized>(job: &mut Job, parts: Vec<SglIoSeg>, mgr: &mut A, early: &mut Vec<Job>) {
    let base = job.clone_shape();

    let mut init = base.clone_shape();
    init.sgl_state = SglState::Init;
    submit_sub_job(mgr, init, early);

    trace!(parts = parts.len(), "multi-job SGL stream");
    for part in parts {
        let mut update = base.clone_shape();
        update.sgl_state = SglState::Update;
        update.src = Some(part.input);
        update.dst = Some(part.output);
        update.msg_len_to_cipher = Extent::Bytes(part.len as u64);
        update.msg_len_to_hash = Extent::Bytes(part.len as u64);
        submit_sub_job(mgr, update, early);
    }

    job.sgl_state = SglState::Complete;
}

fn submit_sub_job<A: BatchAccelerator + ?Sized>(mgr: &mut A, job: Job, early: &mut Vec<Job>) {
    if mgr.get_next_job().is_none() {
        early.extend(mgr.flush_job());
    }
    early.extend(mgr.submit_job(job));
    while let Some(done) = mgr.get_completed_job() {
        early.push(done);
    }
}
