// ## 📂 File: `src/session/keys.rs`

//! session/keys.rs
//! Expanded key material owned by a session.
//!
//! Design notes:
//! - One variant per key layout instead of a union of byte arrays; reading
//!   a GCM key out of a CBC session is a type error.
//! - Every container wipes itself on drop (`Zeroizing`, or the `zeroize`
//!   feature of the RustCrypto ciphers).
//! - Expansion happens once, at compile time; jobs share keys through `Arc`.

use std::fmt;

use zeroize::Zeroizing;

use crate::crypto::{cmac_subkeys, hmac_pads, xcbc_keys, AeadImpl, AesSchedule, Block16, CryptoError, HashFn};

/// Copy a key of exactly `N` bytes into a wiping container.
pub fn fixed_key<const N: usize>(key: &[u8]) -> Option<Zeroizing<[u8; N]>> {
    if key.len() != N {
        return None;
    }
    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(key);
    Some(out)
}

/// AES-GCM key with its precomputed hash subkey H = E_K(0^128).
#[derive(Clone)]
pub struct GcmKey {
    pub aead: AeadImpl,
    pub hash_key: Zeroizing<Block16>,
    pub key_len: usize,
}

impl GcmKey {
    pub fn precompute(key: &[u8]) -> Result<Self, CryptoError> {
        let ks = AesSchedule::expand(key)?;
        let mut h = Zeroizing::new([0u8; 16]);
        ks.encrypt_block(&mut h);
        Ok(Self { aead: AeadImpl::gcm(key)?, hash_key: h, key_len: key.len() })
    }
}

impl fmt::Debug for GcmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcmKey({} bytes)", self.key_len)
    }
}

#[derive(Clone, Default)]
pub enum CipherKey {
    #[default]
    None,
    /// AES CBC/CTR/ECB/DOCSIS-BPI/CCM (encrypt and decrypt schedules).
    Aes(AesSchedule),
    Des(Zeroizing<[u8; 8]>),
    /// K1/K2/K3 after the legacy 8/16/24-byte expansion rule.
    TripleDes {
        k1: Zeroizing<[u8; 8]>,
        k2: Zeroizing<[u8; 8]>,
        k3: Zeroizing<[u8; 8]>,
    },
    Zuc(Zeroizing<Vec<u8>>),
    Snow3g(Zeroizing<[u8; 16]>),
    Kasumi(Zeroizing<[u8; 16]>),
    Sm4(Zeroizing<[u8; 16]>),
    Gcm(GcmKey),
    Chacha(Zeroizing<[u8; 32]>),
    Sm4Gcm(Zeroizing<[u8; 16]>),
}

impl CipherKey {
    pub fn name(&self) -> &'static str {
        match self {
            CipherKey::None => "none",
            CipherKey::Aes(_) => "aes",
            CipherKey::Des(_) => "des",
            CipherKey::TripleDes { .. } => "3des",
            CipherKey::Zuc(_) => "zuc",
            CipherKey::Snow3g(_) => "snow3g",
            CipherKey::Kasumi(_) => "kasumi",
            CipherKey::Sm4(_) => "sm4",
            CipherKey::Gcm(_) => "gcm",
            CipherKey::Chacha(_) => "chacha20",
            CipherKey::Sm4Gcm(_) => "sm4-gcm",
        }
    }

    /// 3DES key expansion: 24 bytes K1K2K3, 16 bytes K1K2K1, 8 bytes K1K1K1.
    pub fn triple_des(key: &[u8]) -> Option<Self> {
        let part = |i: usize| fixed_key::<8>(&key[i * 8..(i + 1) * 8]);
        let (k1, k2, k3) = match key.len() {
            24 => (part(0)?, part(1)?, part(2)?),
            16 => (part(0)?, part(1)?, part(0)?),
            8 => (part(0)?, part(0)?, part(0)?),
            _ => return None,
        };
        Some(CipherKey::TripleDes { k1, k2, k3 })
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey::{}", self.name())
    }
}

#[derive(Clone, Default)]
pub enum AuthKey {
    #[default]
    None,
    /// Precomputed key XOR ipad / key XOR opad blocks.
    Hmac {
        inner: Zeroizing<Vec<u8>>,
        outer: Zeroizing<Vec<u8>>,
    },
    Xcbc {
        k1: AesSchedule,
        k2: Zeroizing<Block16>,
        k3: Zeroizing<Block16>,
    },
    Cmac {
        key: AesSchedule,
        sk1: Zeroizing<Block16>,
        sk2: Zeroizing<Block16>,
    },
    Gmac(GcmKey),
    Zuc(Zeroizing<Vec<u8>>),
    Snow3g(Zeroizing<[u8; 16]>),
    Kasumi(Zeroizing<[u8; 16]>),
}

impl AuthKey {
    pub fn hmac(f: HashFn, key: &[u8]) -> Self {
        let (inner, outer) = hmac_pads(f, key);
        AuthKey::Hmac { inner: Zeroizing::new(inner), outer: Zeroizing::new(outer) }
    }

    pub fn xcbc(key: &[u8]) -> Result<Self, CryptoError> {
        let (k1, k2, k3) = xcbc_keys(key)?;
        Ok(AuthKey::Xcbc { k1, k2: Zeroizing::new(k2), k3: Zeroizing::new(k3) })
    }

    pub fn cmac(key: &[u8]) -> Result<Self, CryptoError> {
        let ks = AesSchedule::expand(key)?;
        let (sk1, sk2) = cmac_subkeys(&ks);
        Ok(AuthKey::Cmac { key: ks, sk1: Zeroizing::new(sk1), sk2: Zeroizing::new(sk2) })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthKey::None => "none",
            AuthKey::Hmac { .. } => "hmac",
            AuthKey::Xcbc { .. } => "xcbc",
            AuthKey::Cmac { .. } => "cmac",
            AuthKey::Gmac(_) => "gmac",
            AuthKey::Zuc(_) => "zuc",
            AuthKey::Snow3g(_) => "snow3g",
            AuthKey::Kasumi(_) => "kasumi",
        }
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthKey::{}", self.name())
    }
}

/// All key material of one session.
#[derive(Clone, Debug, Default)]
pub struct SessionKeys {
    pub cipher: CipherKey,
    pub auth: AuthKey,
}
