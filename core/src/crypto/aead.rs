// ## 📂 File: `src/crypto/aead.rs`

//! AEAD primitives for AES-GCM (128/192/256) and ChaCha20-Poly1305.
//!
//! Design notes:
//! - All variants use 12-byte nonces and produce 16-byte tags.
//! - Tags are detached: the accelerator writes the tag wherever the job says,
//!   and verification happens in post-processing, not here.
//! - `open_detached` decrypts without verifying and returns the tag the
//!   ciphertext should carry. It relies on the keystream not depending on the
//!   data: sealing the ciphertext yields the plaintext, and sealing that
//!   plaintext yields the ciphertext again together with its tag.

use aes::Aes192;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use chacha20poly1305::ChaCha20Poly1305;

use crate::constants::NONCE_LEN_12;
use crate::crypto::types::{CryptoError, TAG_LEN};

pub type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Clone)]
pub enum AeadImpl {
    AesGcm128(Aes128Gcm),
    AesGcm192(Aes192Gcm),
    AesGcm256(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

impl std::fmt::Debug for AeadImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AeadImpl::AesGcm128(_) => "AES-128-GCM",
            AeadImpl::AesGcm192(_) => "AES-192-GCM",
            AeadImpl::AesGcm256(_) => "AES-256-GCM",
            AeadImpl::ChaCha(_) => "ChaCha20-Poly1305",
        };
        write!(f, "AeadImpl({})", name)
    }
}

impl AeadImpl {
    /// AES-GCM keyed by length (16/24/32).
    pub fn gcm(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLen { actual: key.len() };
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key).map(AeadImpl::AesGcm128).map_err(invalid),
            24 => Aes192Gcm::new_from_slice(key).map(AeadImpl::AesGcm192).map_err(invalid),
            32 => Aes256Gcm::new_from_slice(key).map(AeadImpl::AesGcm256).map_err(invalid),
            actual => Err(CryptoError::InvalidKeyLen { actual }),
        }
    }

    pub fn chacha(key: &[u8]) -> Result<Self, CryptoError> {
        ChaCha20Poly1305::new_from_slice(key)
            .map(AeadImpl::ChaCha)
            .map_err(|_| CryptoError::InvalidKeyLen { actual: key.len() })
    }

    /// Encrypt `buf` in place; returns the full 16-byte tag.
    pub fn seal_detached(&self, nonce_12: &[u8], aad: &[u8], buf: &mut [u8]) -> Result<[u8; TAG_LEN], CryptoError> {
        if nonce_12.len() != NONCE_LEN_12 {
            return Err(CryptoError::InvalidNonceLen { actual: nonce_12.len() });
        }

        let tag = match self {
            AeadImpl::AesGcm128(c) => c.encrypt_in_place_detached(nonce_12.into(), aad, buf),
            AeadImpl::AesGcm192(c) => c.encrypt_in_place_detached(nonce_12.into(), aad, buf),
            AeadImpl::AesGcm256(c) => c.encrypt_in_place_detached(nonce_12.into(), aad, buf),
            AeadImpl::ChaCha(c) => c.encrypt_in_place_detached(nonce_12.into(), aad, buf),
        }
        .map_err(|_| CryptoError::Failure("AEAD seal failed".into()))?;

        let mut out = [0u8; TAG_LEN];
        out.copy_from_slice(&tag);
        Ok(out)
    }

    /// Decrypt `buf` in place without verification; returns the expected tag.
    pub fn open_detached(&self, nonce_12: &[u8], aad: &[u8], buf: &mut [u8]) -> Result<[u8; TAG_LEN], CryptoError> {
        self.seal_detached(nonce_12, aad, buf)?;
        let mut again = buf.to_vec();
        self.seal_detached(nonce_12, aad, &mut again)
    }

    /// GMAC: the whole message is authenticated data.
    pub fn gmac(&self, iv: &[u8], msg: &[u8]) -> Result<[u8; TAG_LEN], CryptoError> {
        self.seal_detached(iv, msg, &mut [])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_detached_recovers_plaintext_and_tag() {
        for imp in [AeadImpl::gcm(&[1u8; 24]).unwrap(), AeadImpl::chacha(&[2u8; 32]).unwrap()] {
            let nonce = [3u8; 12];
            let plain = b"detached tag round trip".to_vec();
            let mut buf = plain.clone();
            let tag = imp.seal_detached(&nonce, b"hdr", &mut buf).unwrap();
            let recomputed = imp.open_detached(&nonce, b"hdr", &mut buf).unwrap();
            assert_eq!(buf, plain);
            assert_eq!(tag, recomputed);
        }
    }

    #[test]
    fn gmac_of_empty_message_matches_gcm_zero_vectors() {
        for (key_len, tag) in [
            (16, "58e2fccefa7e3061367f1d57a4e7455a"),
            (24, "cd33b28ac773f74ba00ed1f312572435"),
            (32, "530f8afbc74536b9a963b4f1c4cb738b"),
        ] {
            let imp = AeadImpl::gcm(&vec![0u8; key_len]).unwrap();
            assert_eq!(imp.gmac(&[0u8; 12], &[]).unwrap().to_vec(), hex::decode(tag).unwrap(), "key {}", key_len);
        }
    }

    // RFC 8439 section 2.8.2.
    #[test]
    fn chacha20_poly1305_matches_rfc8439() {
        let key: Vec<u8> = (0x80..=0x9fu8).collect();
        let nonce = hex::decode("070000004041424344454647").unwrap();
        let aad = hex::decode("50515253c0c1c2c3c4c5c6c7").unwrap();
        let mut buf = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.".to_vec();

        let imp = AeadImpl::chacha(&key).unwrap();
        let tag = imp.seal_detached(&nonce, &aad, &mut buf).unwrap();
        assert_eq!(&buf[..16], &hex::decode("d31a8d34648e60db7b86afbc53ef7ec2").unwrap()[..]);
        assert_eq!(tag.to_vec(), hex::decode("1ae10b594f09e26a7e902ecbd0600691").unwrap());
    }

    #[test]
    fn rejects_bad_nonce() {
        let imp = AeadImpl::gcm(&[0u8; 16]).unwrap();
        let err = imp.seal_detached(&[0u8; 8], &[], &mut []).unwrap_err();
        assert_eq!(err, CryptoError::InvalidNonceLen { actual: 8 });
    }
}
