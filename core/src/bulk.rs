// ## 📂 File: `src/bulk.rs`

//! bulk.rs
//! Synchronous bulk processing on the calling CPU.
//!
//! Design notes:
//! - Every element is a single contiguous buffer processed in place; the
//!   head/tail offsets are shared by the whole vector.
//! - Tags land in per-element temporaries and are verified or copied out
//!   only after every job has come back.
//! - Element failures are recorded in the element; the return value counts
//!   successes.

use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use crate::accel::BatchAccelerator;
use crate::constants::{CCM_AAD_OFFSET, CCM_IV_OFFSET, DIGEST_LENGTH_MAX};
use crate::job::types::{Extent, HashAlg, Job, JobStatus};
use crate::mbuf::{BufHandle, BufPtr};
use crate::session::template::Session;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BulkStatus {
    #[default]
    Pending,
    Ok,
    /// More than one segment.
    NotSupported,
    /// Offsets do not fit the buffer.
    InvalidArgs,
    /// Digest mismatch or accelerator failure.
    BadMessage,
}

/// Bytes skipped at the start and end of a buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadTail {
    pub head: u32,
    pub tail: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SymOfs {
    pub cipher: HeadTail,
    pub auth: HeadTail,
}

#[derive(Debug)]
pub struct BulkElem {
    pub sgl: Vec<BufHandle>,
    pub iv: BufPtr,
    pub aad: Option<BufPtr>,
    pub digest: Option<BufPtr>,
    pub status: BulkStatus,
}

impl BulkElem {
    pub fn new(buf: BufHandle, iv: BufPtr) -> Self {
        Self { sgl: vec![buf], iv, aad: None, digest: None, status: BulkStatus::Pending }
    }

    pub fn with_aad(mut self, aad: BufPtr) -> Self {
        self.aad = Some(aad);
        self
    }

    pub fn with_digest(mut self, digest: BufPtr) -> Self {
        self.digest = Some(digest);
        self
    }
}

fn check_elem(ofs: &SymOfs, elem: &BulkElem) -> Result<usize, BulkStatus> {
    let [buf] = elem.sgl.as_slice() else {
        return Err(BulkStatus::NotSupported);
    };
    let len = buf.len();
    let cipher = (ofs.cipher.head + ofs.cipher.tail) as usize;
    let auth = (ofs.auth.head + ofs.auth.tail) as usize;
    if cipher > len || auth > len {
        return Err(BulkStatus::InvalidArgs);
    }
    Ok(len)
}

fn set_cpu_job_params(tmpl: &Job, ofs: &SymOfs, elem: &BulkElem, len: usize, digest: BufPtr, index: usize) -> Job {
    let mut job = tmpl.clone_shape();
    job.iv = Some(elem.iv.clone());

    match job.tmpl.hash_alg {
        HashAlg::AesCcm => {
            job.aad = elem.aad.as_ref().map(|a| a.add(CCM_AAD_OFFSET));
            job.iv = Some(elem.iv.add(CCM_IV_OFFSET));
        }
        HashAlg::AesGmac | HashAlg::Chacha20Poly1305 | HashAlg::Sm4Gcm => job.aad = elem.aad.clone(),
        HashAlg::AesGmac128 | HashAlg::AesGmac192 | HashAlg::AesGmac256 => job.auth_iv = Some(elem.iv.clone()),
        _ => {}
    }

    job.auth_tag_output = Some(digest);
    let buf = &elem.sgl[0];
    job.src = Some(buf.at(0));
    job.dst = Some(buf.at(ofs.cipher.head as usize));
    job.cipher_start = Extent::Bytes(ofs.cipher.head as u64);
    job.hash_start_offset = ofs.auth.head as u64;
    job.msg_len_to_hash = Extent::Bytes((len - (ofs.auth.head + ofs.auth.tail) as usize) as u64);
    job.msg_len_to_cipher = Extent::Bytes((len - (ofs.cipher.head + ofs.cipher.tail) as usize) as u64);
    job.sync_index = Some(index);
    job
}

fn complete(job: Job, vec: &mut [BulkElem]) -> usize {
    let Some(i) = job.sync_index else { return 0 };
    if let Some(elem) = vec.get_mut(i) {
        elem.status = if job.status == JobStatus::Completed { BulkStatus::Ok } else { BulkStatus::BadMessage };
    }
    1
}

fn drain_completed<A: BatchAccelerator + ?Sized>(first: Option<Job>, mgr: &mut A, vec: &mut [BulkElem]) -> usize {
    let mut n = 0;
    let mut next = first;
    while let Some(job) = next {
        n += complete(job, vec);
        next = mgr.get_completed_job();
    }
    n
}

/// Run every element of `vec` through `sess` on `mgr`; returns how many succeeded.
pub fn process_bulk<A: BatchAccelerator + ?Sized>(
    sess: &Session,
    mgr: &mut A,
    ofs: SymOfs,
    vec: &mut [BulkElem],
) -> u32 {
    if !sess.is_active() || sess.is_security() {
        debug!("bulk processing needs an active crypto session");
        for elem in vec.iter_mut() {
            elem.status = BulkStatus::InvalidArgs;
        }
        return 0;
    }

    let mut shape = Job::from_template(&sess.template);
    shape.sess = sess.params;
    shape.tmpl.session_id = mgr.set_session(&shape.tmpl);

    let digests: Vec<BufHandle> = (0..vec.len()).map(|_| BufHandle::zeroed(DIGEST_LENGTH_MAX)).collect();
    let (mut submitted, mut done) = (0usize, 0usize);

    for i in 0..vec.len() {
        let len = match check_elem(&ofs, &vec[i]) {
            Ok(len) => len,
            Err(status) => {
                vec[i].status = status;
                continue;
            }
        };

        if mgr.get_next_job().is_none() {
            let flushed = mgr.flush_job();
            done += drain_completed(flushed, mgr, vec);
        }

        let job = set_cpu_job_params(&shape, &ofs, &vec[i], len, digests[i].at(0), i);
        let first = mgr.submit_job(job);
        submitted += 1;
        done += drain_completed(first, mgr, vec);
    }

    while done < submitted {
        let flushed = mgr.flush_job();
        if flushed.is_none() {
            break;
        }
        done += drain_completed(flushed, mgr, vec);
    }
    trace!(submitted, done, "bulk jobs drained");

    if sess.template.hash_alg == HashAlg::Null {
        return vec.iter().filter(|e| e.status == BulkStatus::Ok).count() as u32;
    }

    let req = sess.params.req_digest_len as usize;
    let verify = sess.params.is_verify();
    let mut ok = 0;
    for (elem, tmp) in vec.iter_mut().zip(&digests) {
        if elem.status != BulkStatus::Ok {
            continue;
        }
        let Some(digest) = elem.digest.as_ref() else {
            elem.status = BulkStatus::InvalidArgs;
            continue;
        };
        let passed = if verify {
            match (tmp.read(0, req), digest.read(req)) {
                (Ok(computed), Ok(given)) => bool::from(computed.as_slice().ct_eq(given.as_slice())),
                _ => false,
            }
        } else {
            tmp.at(0).copy_to(digest, req).is_ok()
        };
        if passed {
            ok += 1;
        } else {
            elem.status = BulkStatus::BadMessage;
        }
    }
    ok
}
