// ## 📂 File: `src/crypto/digest.rs`

//! Hash primitives used for HMAC pad precompute and by the software accelerator.
//!
//! Design notes:
//! - One enum variant per hash function keeps dispatch closed and explicit.
//! - HMAC is expressed over precomputed ipad/opad blocks, the same inputs the
//!   session compiler stores in the job template.

use digest::Digest;
use num_enum::TryFromPrimitive;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::constants::{block_sizes, HMAC_MAX_BLOCK_SIZE};

/// Underlying hash function of an auth algorithm.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HashFn {
    Md5 = 0x0001,
    Sha1 = 0x0002,
    Sha224 = 0x0003,
    Sha256 = 0x0004,
    Sha384 = 0x0005,
    Sha512 = 0x0006,
    Sm3 = 0x0007,
}

impl HashFn {
    /// Input block size; the HMAC pad width.
    pub fn block_size(self) -> usize {
        match self {
            HashFn::Md5 => block_sizes::MD5,
            HashFn::Sha1 => block_sizes::SHA1,
            HashFn::Sha224 => block_sizes::SHA224,
            HashFn::Sha256 => block_sizes::SHA256,
            HashFn::Sha384 => block_sizes::SHA384,
            HashFn::Sha512 => block_sizes::SHA512,
            HashFn::Sm3 => block_sizes::SM3,
        }
    }

    pub fn output_len(self) -> usize {
        match self {
            HashFn::Md5 => 16,
            HashFn::Sha1 => 20,
            HashFn::Sha224 => 28,
            HashFn::Sha256 => 32,
            HashFn::Sha384 => 48,
            HashFn::Sha512 => 64,
            HashFn::Sm3 => 32,
        }
    }
}

/// Internal hashing state.
pub enum DigestState {
    Md5(md5::Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Sm3(sm3::Sm3),
}

impl DigestState {
    pub fn new(f: HashFn) -> Self {
        match f {
            HashFn::Md5 => DigestState::Md5(md5::Md5::new()),
            HashFn::Sha1 => DigestState::Sha1(Sha1::new()),
            HashFn::Sha224 => DigestState::Sha224(Sha224::new()),
            HashFn::Sha256 => DigestState::Sha256(Sha256::new()),
            HashFn::Sha384 => DigestState::Sha384(Sha384::new()),
            HashFn::Sha512 => DigestState::Sha512(Sha512::new()),
            HashFn::Sm3 => DigestState::Sm3(sm3::Sm3::new()),
        }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Md5(h) => h.update(data),
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha224(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha384(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
            DigestState::Sm3(h) => h.update(data),
        }
    }

    #[inline]
    pub fn finalize(self) -> Vec<u8> {
        match self {
            DigestState::Md5(h) => h.finalize().to_vec(),
            DigestState::Sha1(h) => h.finalize().to_vec(),
            DigestState::Sha224(h) => h.finalize().to_vec(),
            DigestState::Sha256(h) => h.finalize().to_vec(),
            DigestState::Sha384(h) => h.finalize().to_vec(),
            DigestState::Sha512(h) => h.finalize().to_vec(),
            DigestState::Sm3(h) => h.finalize().to_vec(),
        }
    }
}

/// One-shot hash over the concatenation of `parts`.
pub fn hash(f: HashFn, parts: &[&[u8]]) -> Vec<u8> {
    let mut state = DigestState::new(f);
    for p in parts {
        state.update(p);
    }
    state.finalize()
}

/// Key XOR ipad / key XOR opad blocks, each `block_size` bytes.
pub fn hmac_pads(f: HashFn, key: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let bs = f.block_size();
    debug_assert!(bs <= HMAC_MAX_BLOCK_SIZE);

    let mut k = vec![0u8; bs];
    if key.len() > bs {
        // Long keys are replaced by their digest.
        let hashed = hash(f, &[key]);
        k[..hashed.len()].copy_from_slice(&hashed);
    } else {
        k[..key.len()].copy_from_slice(key);
    }

    let inner = k.iter().map(|b| b ^ 0x36).collect();
    let outer = k.iter().map(|b| b ^ 0x5c).collect();
    k.iter_mut().for_each(|b| *b = 0);
    (inner, outer)
}

/// HMAC over `msg` using precomputed pads.
///
/// The `hmac` crate keys from raw key bytes; sessions only keep the
/// ipad/opad blocks, so the two hash passes run here directly.
pub fn hmac_with_pads(f: HashFn, ipad: &[u8], opad: &[u8], msg: &[u8]) -> Vec<u8> {
    let inner = hash(f, &[ipad, msg]);
    hash(f, &[opad, &inner])
}
