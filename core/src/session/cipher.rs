// ## 📂 File: `src/session/cipher.rs`

//! session/cipher.rs
//! Cipher families: mode selection, key-length allow-lists and key expansion.

use tracing::error;
use zeroize::Zeroizing;

use crate::constants::key_sizes::{KEY_128, KEY_192, KEY_256, KEY_64};
use crate::crypto::AesSchedule;
use crate::job::types::{CipherDirection, CipherMode};
use crate::session::keys::{fixed_key, CipherKey};
use crate::session::types::SessionError;
use crate::session::xform::{CipherAlgo, CipherOp, CipherXform};
use crate::session::{invalid_key, ParamCompiler, SessionDraft};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CipherFamily {
    Null,
    /// AES CBC/CTR/ECB: 128/192/256-bit keys.
    Aes(CipherMode),
    /// AES DOCSIS BPI: 128/256-bit keys.
    DocsisAes,
    /// Single DES (CBC or DOCSIS BPI).
    Des(CipherMode),
    TripleDes,
    Zuc,
    Snow3g,
    Kasumi,
    Sm4(CipherMode),
}

impl CipherFamily {
    pub fn classify(algo: CipherAlgo) -> Result<Self, SessionError> {
        use CipherAlgo as C;
        let family = match algo {
            C::Null => CipherFamily::Null,
            C::AesCbc => CipherFamily::Aes(CipherMode::Cbc),
            C::AesCtr => CipherFamily::Aes(CipherMode::Cntr),
            C::AesEcb => CipherFamily::Aes(CipherMode::Ecb),
            C::AesDocsisBpi => CipherFamily::DocsisAes,
            C::DesCbc => CipherFamily::Des(CipherMode::Des),
            C::DesDocsisBpi => CipherFamily::Des(CipherMode::DocsisDes),
            C::TripleDesCbc => CipherFamily::TripleDes,
            C::ZucEea3 => CipherFamily::Zuc,
            C::Snow3gUea2 => CipherFamily::Snow3g,
            C::KasumiF8 => CipherFamily::Kasumi,
            C::Sm4Cbc => CipherFamily::Sm4(CipherMode::Sm4Cbc),
            C::Sm4Ecb => CipherFamily::Sm4(CipherMode::Sm4Ecb),
            C::Sm4Ctr => CipherFamily::Sm4(CipherMode::Sm4Cntr),
            other @ (C::AesXts | C::AesF8 | C::TripleDesEcb) => {
                error!(algo = ?other, "unsupported cipher mode parameter");
                return Err(SessionError::UnsupportedCipher(format!("{:?}", other)));
            }
        };
        Ok(family)
    }

    pub fn mode(&self) -> CipherMode {
        match *self {
            CipherFamily::Null => CipherMode::Null,
            CipherFamily::Aes(m) | CipherFamily::Des(m) | CipherFamily::Sm4(m) => m,
            CipherFamily::DocsisAes => CipherMode::DocsisSecBpi,
            CipherFamily::TripleDes => CipherMode::Des3,
            CipherFamily::Zuc => CipherMode::ZucEea3,
            CipherFamily::Snow3g => CipherMode::Snow3gUea2Bitlen,
            CipherFamily::Kasumi => CipherMode::KasumiUea1Bitlen,
        }
    }
}

impl ParamCompiler for CipherFamily {
    type Xform = CipherXform;

    fn compile(&self, xform: &CipherXform, draft: &mut SessionDraft) -> Result<(), SessionError> {
        let key = xform.key.as_bytes();
        let bad_key = || invalid_key(xform.algo, key.len());
        let t = &mut draft.template;

        t.cipher_direction = match xform.op {
            CipherOp::Encrypt => CipherDirection::Encrypt,
            CipherOp::Decrypt => CipherDirection::Decrypt,
        };
        t.cipher_mode = self.mode();

        draft.params.iv.offset = xform.iv.offset;
        t.iv_len = xform.iv.length;

        let (cipher_key, key_len) = match *self {
            CipherFamily::Null => (CipherKey::None, 0),

            CipherFamily::Aes(_) => match key.len() {
                KEY_128 | KEY_192 | KEY_256 => (CipherKey::Aes(AesSchedule::expand(key)?), key.len()),
                _ => return Err(bad_key()),
            },

            CipherFamily::DocsisAes => match key.len() {
                KEY_128 | KEY_256 => (CipherKey::Aes(AesSchedule::expand(key)?), key.len()),
                _ => return Err(bad_key()),
            },

            CipherFamily::Des(_) => (CipherKey::Des(fixed_key::<KEY_64>(key).ok_or_else(bad_key)?), KEY_64),

            // Template key length is 24 whatever the legacy input width.
            CipherFamily::TripleDes => (CipherKey::triple_des(key).ok_or_else(bad_key)?, 24),

            CipherFamily::Zuc => match key.len() {
                KEY_128 | KEY_256 => (CipherKey::Zuc(Zeroizing::new(key.to_vec())), key.len()),
                _ => return Err(bad_key()),
            },

            CipherFamily::Snow3g => (CipherKey::Snow3g(fixed_key::<KEY_128>(key).ok_or_else(bad_key)?), KEY_128),
            CipherFamily::Kasumi => (CipherKey::Kasumi(fixed_key::<KEY_128>(key).ok_or_else(bad_key)?), KEY_128),
            CipherFamily::Sm4(_) => (CipherKey::Sm4(fixed_key::<KEY_128>(key).ok_or_else(bad_key)?), KEY_128),
        };

        t.key_len = key_len as u16;
        draft.keys.cipher = cipher_key;
        Ok(())
    }
}

/// Cipher step of a session; no transform means the NULL cipher.
pub fn compile_cipher(xform: Option<&CipherXform>, draft: &mut SessionDraft) -> Result<(), SessionError> {
    let Some(xform) = xform else {
        draft.template.cipher_mode = CipherMode::Null;
        return Ok(());
    };
    CipherFamily::classify(xform.algo)?.compile(xform, draft)
}
