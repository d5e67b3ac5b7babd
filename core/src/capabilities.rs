// ## 📂 File: `src/capabilities.rs`

//! capabilities.rs
//! Device feature flags and the per-algorithm capability table.
//!
//! Design notes:
//! - Sizes mirror what the session compiler accepts; the table is for
//!   callers picking parameters, the compiler remains the authority.
//! - `software` marks algorithms `SoftwareManager` can execute. The rest
//!   compile into valid sessions for accelerators that implement them.

use crate::session::xform::{AeadAlgo, AuthAlgo, CipherAlgo};
use crate::utils::enum_name_or_hex;

bitflags::bitflags! {
    /// Features advertised by the driver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FeatureFlags: u32 {
        const SYMMETRIC_CRYPTO = 1 << 0;
        /// Cipher and auth in one operation.
        const OPERATION_CHAINING = 1 << 1;
        const OOP_LB_IN_LB_OUT = 1 << 2;
        /// Synchronous bulk processing on the calling CPU.
        const CPU_CRYPTO = 1 << 3;
        /// Bit-granular regions for wireless algorithms.
        const NON_BYTE_ALIGNED_DATA = 1 << 4;
        const SESSIONLESS = 1 << 5;
        const IN_PLACE_SGL = 1 << 6;
        const OOP_SGL_IN_SGL_OUT = 1 << 7;
        const OOP_LB_IN_SGL_OUT = 1 << 8;
        const OOP_SGL_IN_LB_OUT = 1 << 9;
        /// DOCSIS lookaside protocol sessions.
        const SECURITY = 1 << 10;
        /// Digest may sit inside the region being encrypted.
        const DIGEST_ENCRYPTED = 1 << 11;
    }
}

pub const DEVICE_FEATURES: FeatureFlags = FeatureFlags::all();

/// Inclusive size range stepping by `increment`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SizeRange {
    pub min: u16,
    pub max: u16,
    pub increment: u16,
}

impl SizeRange {
    pub const fn new(min: u16, max: u16, increment: u16) -> Self {
        Self { min, max, increment }
    }

    pub const fn fixed(n: u16) -> Self {
        Self::new(n, n, 0)
    }

    pub fn contains(&self, n: usize) -> bool {
        let (min, max) = (self.min as usize, self.max as usize);
        if n < min || n > max {
            return false;
        }
        self.increment == 0 || (n - min) % self.increment as usize == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlgoId {
    Cipher(CipherAlgo),
    Auth(AuthAlgo),
    Aead(AeadAlgo),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capability {
    pub algo: AlgoId,
    pub key: SizeRange,
    pub digest: SizeRange,
    pub iv: SizeRange,
    pub software: bool,
}

const NONE: SizeRange = SizeRange::fixed(0);
const HMAC_KEY: SizeRange = SizeRange::new(1, 65535, 1);

const fn cipher(algo: CipherAlgo, key: SizeRange, iv: SizeRange, software: bool) -> Capability {
    Capability { algo: AlgoId::Cipher(algo), key, digest: NONE, iv, software }
}

const fn auth(algo: AuthAlgo, key: SizeRange, digest: SizeRange, software: bool) -> Capability {
    Capability { algo: AlgoId::Auth(algo), key, digest, iv: NONE, software }
}

const fn aead(algo: AeadAlgo, key: SizeRange, digest: SizeRange, iv: SizeRange, software: bool) -> Capability {
    Capability { algo: AlgoId::Aead(algo), key, digest, iv, software }
}

pub static CAPABILITIES: &[Capability] = &[
    cipher(CipherAlgo::Null, NONE, NONE, true),
    cipher(CipherAlgo::AesCbc, SizeRange::new(16, 32, 8), SizeRange::fixed(16), true),
    cipher(CipherAlgo::AesCtr, SizeRange::new(16, 32, 8), SizeRange::new(12, 16, 4), true),
    cipher(CipherAlgo::AesEcb, SizeRange::new(16, 32, 8), NONE, true),
    cipher(CipherAlgo::AesDocsisBpi, SizeRange::new(16, 32, 16), SizeRange::fixed(16), true),
    cipher(CipherAlgo::DesCbc, SizeRange::fixed(8), SizeRange::fixed(8), false),
    cipher(CipherAlgo::DesDocsisBpi, SizeRange::fixed(8), SizeRange::fixed(8), false),
    cipher(CipherAlgo::TripleDesCbc, SizeRange::new(8, 24, 8), SizeRange::fixed(8), false),
    cipher(CipherAlgo::ZucEea3, SizeRange::new(16, 32, 16), SizeRange::new(16, 25, 9), false),
    cipher(CipherAlgo::Snow3gUea2, SizeRange::fixed(16), SizeRange::fixed(16), false),
    cipher(CipherAlgo::KasumiF8, SizeRange::fixed(16), SizeRange::fixed(8), false),
    cipher(CipherAlgo::Sm4Cbc, SizeRange::fixed(16), SizeRange::fixed(16), false),
    cipher(CipherAlgo::Sm4Ecb, SizeRange::fixed(16), NONE, false),
    cipher(CipherAlgo::Sm4Ctr, SizeRange::fixed(16), SizeRange::fixed(16), false),
    auth(AuthAlgo::Null, NONE, NONE, true),
    auth(AuthAlgo::Md5Hmac, HMAC_KEY, SizeRange::new(1, 16, 1), true),
    auth(AuthAlgo::Sha1Hmac, HMAC_KEY, SizeRange::new(1, 20, 1), true),
    auth(AuthAlgo::Sha224Hmac, HMAC_KEY, SizeRange::new(1, 28, 1), true),
    auth(AuthAlgo::Sha256Hmac, HMAC_KEY, SizeRange::new(1, 32, 1), true),
    auth(AuthAlgo::Sha384Hmac, HMAC_KEY, SizeRange::new(1, 48, 1), true),
    auth(AuthAlgo::Sha512Hmac, HMAC_KEY, SizeRange::new(1, 64, 1), true),
    auth(AuthAlgo::Sha1, NONE, SizeRange::new(1, 20, 1), true),
    auth(AuthAlgo::Sha224, NONE, SizeRange::new(1, 28, 1), true),
    auth(AuthAlgo::Sha256, NONE, SizeRange::new(1, 32, 1), true),
    auth(AuthAlgo::Sha384, NONE, SizeRange::new(1, 48, 1), true),
    auth(AuthAlgo::Sha512, NONE, SizeRange::new(1, 64, 1), true),
    auth(AuthAlgo::AesXcbcMac, SizeRange::fixed(16), SizeRange::fixed(12), true),
    auth(AuthAlgo::AesCmac, SizeRange::fixed(16), SizeRange::new(1, 16, 1), true),
    Capability {
        algo: AlgoId::Auth(AuthAlgo::AesGmac),
        key: SizeRange::new(16, 32, 8),
        digest: SizeRange::new(1, 16, 1),
        iv: SizeRange::fixed(12),
        software: true,
    },
    auth(AuthAlgo::ZucEia3, SizeRange::new(16, 32, 16), SizeRange::new(4, 16, 4), false),
    auth(AuthAlgo::Snow3gUia2, SizeRange::fixed(16), SizeRange::fixed(4), false),
    auth(AuthAlgo::KasumiF9, SizeRange::fixed(16), SizeRange::fixed(4), false),
    auth(AuthAlgo::Sm3, NONE, SizeRange::new(1, 32, 1), false),
    auth(AuthAlgo::Sm3Hmac, HMAC_KEY, SizeRange::new(1, 32, 1), false),
    aead(AeadAlgo::AesCcm, SizeRange::new(16, 32, 16), SizeRange::new(4, 16, 2), SizeRange::new(7, 13, 1), true),
    aead(AeadAlgo::AesGcm, SizeRange::new(16, 32, 8), SizeRange::new(1, 16, 1), SizeRange::fixed(12), true),
    aead(AeadAlgo::Chacha20Poly1305, SizeRange::fixed(32), SizeRange::fixed(16), SizeRange::fixed(12), true),
    aead(AeadAlgo::Sm4Gcm, SizeRange::fixed(16), SizeRange::fixed(16), SizeRange::fixed(12), false),
];

pub fn find(algo: AlgoId) -> Option<&'static Capability> {
    CAPABILITIES.iter().find(|c| c.algo == algo)
}

/// Algorithm name for a raw registry id, hex when unknown.
pub fn describe(raw: u16) -> String {
    match raw >> 8 {
        0x00 => enum_name_or_hex::<CipherAlgo>(raw),
        0x01 => enum_name_or_hex::<AuthAlgo>(raw),
        0x02 => enum_name_or_hex::<AeadAlgo>(raw),
        _ => format!("0x{:x}", raw),
    }
}
