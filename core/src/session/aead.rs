// ## 📂 File: `src/session/aead.rs`

//! session/aead.rs
//! AEAD families. The direction fixes both the cipher direction and the
//! auth operation: encrypt generates the tag, decrypt verifies it.

use tracing::error;

use crate::constants::key_sizes::{KEY_128, KEY_192, KEY_256};
use crate::constants::{AES_CCM_DIGEST_MAX_LEN, AES_CCM_DIGEST_MIN_LEN};
use crate::crypto::AesSchedule;
use crate::job::types::{CipherDirection, CipherMode, HashAlg};
use crate::session::keys::{fixed_key, CipherKey, GcmKey};
use crate::session::types::SessionError;
use crate::session::xform::{AeadAlgo, AeadOp, AeadXform, AuthOp};
use crate::session::{invalid_digest, invalid_key, ParamCompiler, SessionDraft};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AeadFamily {
    Ccm,
    Gcm,
    Chacha20Poly1305,
    Sm4Gcm,
}

impl AeadFamily {
    pub fn classify(algo: AeadAlgo) -> Self {
        match algo {
            AeadAlgo::AesCcm => AeadFamily::Ccm,
            AeadAlgo::AesGcm => AeadFamily::Gcm,
            AeadAlgo::Chacha20Poly1305 => AeadFamily::Chacha20Poly1305,
            AeadAlgo::Sm4Gcm => AeadFamily::Sm4Gcm,
        }
    }
}

impl ParamCompiler for AeadFamily {
    type Xform = AeadXform;

    fn compile(&self, xform: &AeadXform, draft: &mut SessionDraft) -> Result<(), SessionError> {
        let key = xform.key.as_bytes();
        let req = xform.digest_length;
        let t = &mut draft.template;

        let (direction, auth_op) = match xform.op {
            AeadOp::Encrypt => (CipherDirection::Encrypt, AuthOp::Generate),
            AeadOp::Decrypt => (CipherDirection::Decrypt, AuthOp::Verify),
        };
        t.cipher_direction = direction;
        draft.params.auth_op = Some(auth_op);

        draft.params.iv.offset = xform.iv.offset;
        t.iv_len = xform.iv.length;

        draft.params.req_digest_len = req;
        t.auth_tag_output_len = req;
        t.aad_len = xform.aad_length;

        match self {
            AeadFamily::Ccm => {
                t.cipher_mode = CipherMode::Ccm;
                t.hash_alg = HashAlg::AesCcm;
                let ks = match key.len() {
                    KEY_128 | KEY_256 => AesSchedule::expand(key)?,
                    other => return Err(invalid_key(xform.algo, other)),
                };
                t.key_len = key.len() as u16;
                draft.keys.cipher = CipherKey::Aes(ks);

                let r = req as usize;
                if !(AES_CCM_DIGEST_MIN_LEN..=AES_CCM_DIGEST_MAX_LEN).contains(&r) || r % 2 == 1 {
                    error!(requested = req, "CCM digest must be even and within 4..=16");
                    return Err(invalid_digest(xform.algo, req));
                }
            }

            AeadFamily::Gcm => {
                t.cipher_mode = CipherMode::Gcm;
                t.hash_alg = HashAlg::AesGmac;
                if !matches!(key.len(), KEY_128 | KEY_192 | KEY_256) {
                    return Err(invalid_key(xform.algo, key.len()));
                }
                t.key_len = key.len() as u16;
                draft.keys.cipher = CipherKey::Gcm(GcmKey::precompute(key)?);

                if req == 0 || req > 16 {
                    return Err(invalid_digest(xform.algo, req));
                }
            }

            AeadFamily::Chacha20Poly1305 => {
                t.cipher_mode = CipherMode::Chacha20Poly1305;
                t.hash_alg = HashAlg::Chacha20Poly1305;
                let k = fixed_key::<KEY_256>(key).ok_or_else(|| invalid_key(xform.algo, key.len()))?;
                t.key_len = KEY_256 as u16;
                draft.keys.cipher = CipherKey::Chacha(k);

                if req != 16 {
                    return Err(invalid_digest(xform.algo, req));
                }
            }

            AeadFamily::Sm4Gcm => {
                t.cipher_mode = CipherMode::Sm4Gcm;
                t.hash_alg = HashAlg::Sm4Gcm;
                let k = fixed_key::<KEY_128>(key).ok_or_else(|| invalid_key(xform.algo, key.len()))?;
                t.key_len = KEY_128 as u16;
                draft.keys.cipher = CipherKey::Sm4Gcm(k);
            }
        }
        Ok(())
    }
}

pub fn compile_aead(xform: &AeadXform, draft: &mut SessionDraft) -> Result<(), SessionError> {
    AeadFamily::classify(xform.algo).compile(xform, draft)
}
