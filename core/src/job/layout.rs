// ## 📂 File: `src/job/layout.rs`

//! job/layout.rs
//! Offset and length rules that decide where a job reads and writes.
//!
//! Design notes:
//! - Wireless algorithms take bit regions from the client; which ones are
//!   converted to bytes is per algorithm and must not be unified.
//! - Address comparisons only make sense inside one buffer handle; the
//!   digest predicate returns false across handles.

use crate::job::types::{ChainOrder, CipherMode, HashAlg};
use crate::mbuf::{BufPtr, BufferError};
use crate::op::CryptoOp;
use crate::session::template::JobTemplate;

/// Where the hash reads from after the start-offset rule ran.
#[derive(Clone, Debug, Default)]
pub struct HashStart {
    /// `Some` when the hash reads the destination buffer instead of the source.
    pub base: Option<BufPtr>,
    pub offset: u64,
}

/// Byte offset of the destination pointer.
pub fn dst_offset(op: &CryptoOp, cipher_mode: CipherMode, aead: bool) -> usize {
    let offset = if aead { op.aead.offset } else { op.cipher.offset };
    match cipher_mode {
        CipherMode::ZucEea3 => (offset >> 3) as usize,
        CipherMode::Snow3gUea2Bitlen | CipherMode::KasumiUea1Bitlen => 0,
        _ => offset as usize,
    }
}

/// End of the cipher region in bytes. Regions are range-checked at build
/// time; an overflowing one saturates here.
pub fn cipher_size(op: &CryptoOp, cipher_mode: CipherMode) -> usize {
    let end = op.cipher.end().unwrap_or(u32::MAX) as usize;
    if cipher_mode.has_bit_region() {
        end >> 3
    } else {
        end
    }
}

/// End of the auth region in bytes.
pub fn auth_size(op: &CryptoOp, hash_alg: HashAlg) -> usize {
    let end = op.auth.end().unwrap_or(u32::MAX) as usize;
    if hash_alg.has_bit_region() {
        end >> 3
    } else {
        end
    }
}

/// True when `digest` lies strictly inside `(start, start + cipher_size)`
/// of the same buffer: the digest was appended to the data and is covered
/// by the cipher.
pub fn digest_in_cipher_region(digest: &BufPtr, start: &BufPtr, cipher_size: usize) -> bool {
    if !digest.same_buffer(start) {
        return false;
    }
    let end = start.offset + cipher_size;
    start.offset < digest.offset && digest.offset < end
}

/// Digest location for an operation whose digest sits inside the ciphered
/// data, measured on the destination when out of place. Returns the
/// position right after the auth region of the source.
pub fn digest_appended_in_src(op: &CryptoOp, tmpl: &JobTemplate, oop: bool) -> Option<BufPtr> {
    if tmpl.cipher_mode == CipherMode::Null {
        return None;
    }
    let digest = op.auth_digest.as_ref()?;
    let cipher_size = cipher_size(op, tmpl.cipher_mode);
    let auth_size = auth_size(op, tmpl.hash_alg);

    let start = if oop { op.m_dst.as_ref()?.mtod()? } else { op.m_src.mtod()? };
    if digest_in_cipher_region(digest, &start, cipher_size) {
        op.m_src.mtod_offset(auth_size)
    } else {
        None
    }
}

/// Authentication start offset.
///
/// Out-of-place cipher-then-hash jobs that are not linearized hash the
/// destination buffer: the auth bytes outside the cipher region are copied
/// from source to destination first. Every other job hashes the source at
/// `auth_offset`.
pub fn auth_start_offset(
    op: &CryptoOp,
    order: ChainOrder,
    oop: bool,
    lb_sgl: bool,
    auth: (u64, u64),
    cipher: (u64, u64),
) -> Result<HashStart, BufferError> {
    let (auth_offset, auth_len) = auth;
    let (cipher_offset, cipher_len) = cipher;

    let direct = HashStart { base: None, offset: auth_offset };
    if !oop || order != ChainOrder::CipherHash || lb_sgl {
        return Ok(direct);
    }
    let (Some(src), Some(dst)) = (op.m_src.mtod(), op.m_dst.as_ref().and_then(|d| d.mtod())) else {
        return Ok(direct);
    };

    if auth_offset < cipher_offset {
        let n = (cipher_offset - auth_offset) as usize;
        src.add(auth_offset as usize).copy_to(&dst.add(auth_offset as usize), n)?;
    }
    let cipher_end = cipher_offset + cipher_len;
    let auth_end = auth_offset + auth_len;
    if cipher_end < auth_end {
        let n = (auth_end - cipher_end) as usize;
        src.add(cipher_end as usize).copy_to(&dst.add(cipher_end as usize), n)?;
    }

    Ok(HashStart { base: Some(dst), offset: auth_offset })
}
