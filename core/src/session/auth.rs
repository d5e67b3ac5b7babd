// ## 📂 File: `src/session/auth.rs`

//! session/auth.rs
//! Authentication families and their digest-length rules.

use tracing::error;

use crate::constants::{digest_sizes, key_sizes};
use crate::crypto::HashFn;
use crate::job::types::{ChainOrder, CipherDirection, HashAlg};
use crate::session::keys::{fixed_key, AuthKey, GcmKey};
use crate::session::types::SessionError;
use crate::session::xform::{AuthAlgo, AuthOp, AuthXform};
use crate::session::{invalid_digest, invalid_key, ParamCompiler, SessionDraft};

/// Closed set of supported authentication families.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthFamily {
    Null,
    Xcbc,
    Cmac,
    Gmac,
    Zuc,
    Snow3g,
    Kasumi,
    /// HMAC over the given hash, with precomputed pads.
    Hmac(HashFn, HashAlg),
    /// Plain hash, no key.
    Plain(HashFn, HashAlg),
}

impl AuthFamily {
    pub fn classify(algo: AuthAlgo) -> Result<Self, SessionError> {
        use AuthAlgo as A;
        let family = match algo {
            A::Null => AuthFamily::Null,
            A::AesXcbcMac => AuthFamily::Xcbc,
            A::AesCmac => AuthFamily::Cmac,
            A::AesGmac => AuthFamily::Gmac,
            A::ZucEia3 => AuthFamily::Zuc,
            A::Snow3gUia2 => AuthFamily::Snow3g,
            A::KasumiF9 => AuthFamily::Kasumi,
            A::Md5Hmac => AuthFamily::Hmac(HashFn::Md5, HashAlg::Md5),
            A::Sha1Hmac => AuthFamily::Hmac(HashFn::Sha1, HashAlg::HmacSha1),
            A::Sha224Hmac => AuthFamily::Hmac(HashFn::Sha224, HashAlg::HmacSha224),
            A::Sha256Hmac => AuthFamily::Hmac(HashFn::Sha256, HashAlg::HmacSha256),
            A::Sha384Hmac => AuthFamily::Hmac(HashFn::Sha384, HashAlg::HmacSha384),
            A::Sha512Hmac => AuthFamily::Hmac(HashFn::Sha512, HashAlg::HmacSha512),
            A::Sm3Hmac => AuthFamily::Hmac(HashFn::Sm3, HashAlg::HmacSm3),
            A::Sha1 => AuthFamily::Plain(HashFn::Sha1, HashAlg::Sha1),
            A::Sha224 => AuthFamily::Plain(HashFn::Sha224, HashAlg::Sha224),
            A::Sha256 => AuthFamily::Plain(HashFn::Sha256, HashAlg::Sha256),
            A::Sha384 => AuthFamily::Plain(HashFn::Sha384, HashAlg::Sha384),
            A::Sha512 => AuthFamily::Plain(HashFn::Sha512, HashAlg::Sha512),
            A::Sm3 => AuthFamily::Plain(HashFn::Sm3, HashAlg::Sm3),
            other @ (A::Md5 | A::AesCbcMac) => {
                error!(algo = ?other, "unsupported authentication algorithm selection");
                return Err(SessionError::UnsupportedAuth(format!("{:?}", other)));
            }
        };
        Ok(family)
    }
}

/// Template tag length for the hash families with a truncated/full pair.
/// Any other requested length makes the accelerator emit the full digest.
pub fn hash_tag_len(alg: HashAlg, requested: u16) -> Result<u16, SessionError> {
    let (trunc, full) = alg.digest_sizes().ok_or_else(|| invalid_digest(alg, requested))?;
    let req = requested as usize;
    if req == 0 || req > full {
        return Err(invalid_digest(alg, requested));
    }
    if req != trunc && req != full {
        Ok(full as u16)
    } else {
        Ok(requested)
    }
}

impl ParamCompiler for AuthFamily {
    type Xform = AuthXform;

    fn compile(&self, xform: &AuthXform, draft: &mut SessionDraft) -> Result<(), SessionError> {
        let key = xform.key.as_bytes();
        let req = xform.digest_length;

        draft.params.auth_iv_offset = xform.iv.offset;
        draft.params.req_digest_len = req;
        draft.params.auth_op = Some(xform.op);
        let t = &mut draft.template;

        match *self {
            AuthFamily::Null => {
                t.hash_alg = HashAlg::Null;
                t.auth_tag_output_len = 0;
            }

            AuthFamily::Xcbc => {
                t.hash_alg = HashAlg::AesXcbc;
                if req as usize != digest_sizes::AES_XCBC.0 {
                    return Err(invalid_digest(xform.algo, req));
                }
                if key.len() != key_sizes::KEY_128 {
                    return Err(invalid_key(xform.algo, key.len()));
                }
                t.auth_tag_output_len = req;
                draft.keys.auth = AuthKey::xcbc(key)?;
            }

            AuthFamily::Cmac => {
                t.hash_alg = HashAlg::AesCmac;
                let full = digest_sizes::AES_CMAC.1;
                if req as usize > full {
                    return Err(invalid_digest(xform.algo, req));
                }
                // Below 4 bytes the full tag is produced and truncated later.
                t.auth_tag_output_len = if req < 4 { full as u16 } else { req };
                if key.len() != key_sizes::KEY_128 {
                    return Err(invalid_key(xform.algo, key.len()));
                }
                draft.keys.auth = AuthKey::cmac(key)?;
            }

            AuthFamily::Gmac => {
                if xform.op == AuthOp::Generate {
                    t.cipher_direction = CipherDirection::Encrypt;
                    t.chain_order = ChainOrder::CipherHash;
                } else {
                    t.cipher_direction = CipherDirection::Decrypt;
                }
                if req as usize > digest_sizes::AES_GMAC.1 {
                    return Err(invalid_digest(xform.algo, req));
                }
                t.auth_tag_output_len = req;
                t.gmac_iv_len = xform.iv.length;
                draft.params.iv.offset = xform.iv.offset;

                t.hash_alg = match key.len() {
                    key_sizes::KEY_128 => HashAlg::AesGmac128,
                    key_sizes::KEY_192 => HashAlg::AesGmac192,
                    key_sizes::KEY_256 => HashAlg::AesGmac256,
                    other => return Err(invalid_key(xform.algo, other)),
                };
                t.key_len = key.len() as u16;
                draft.keys.auth = AuthKey::Gmac(GcmKey::precompute(key)?);
            }

            AuthFamily::Zuc => {
                match key.len() {
                    key_sizes::KEY_128 => {
                        t.hash_alg = HashAlg::ZucEia3Bitlen;
                        if req != 4 {
                            return Err(invalid_digest(xform.algo, req));
                        }
                    }
                    key_sizes::KEY_256 => {
                        t.hash_alg = HashAlg::Zuc256Eia3Bitlen;
                        if !matches!(req, 4 | 8 | 16) {
                            return Err(invalid_digest(xform.algo, req));
                        }
                    }
                    other => return Err(invalid_key(xform.algo, other)),
                }
                t.auth_tag_output_len = req;
                draft.keys.auth = AuthKey::Zuc(zeroize::Zeroizing::new(key.to_vec()));
            }

            AuthFamily::Snow3g | AuthFamily::Kasumi => {
                let (alg, trunc) = if *self == AuthFamily::Snow3g {
                    (HashAlg::Snow3gUia2Bitlen, digest_sizes::WIRELESS.0)
                } else {
                    (HashAlg::KasumiUia1, digest_sizes::WIRELESS.0)
                };
                t.hash_alg = alg;
                if req as usize != trunc {
                    return Err(invalid_digest(xform.algo, req));
                }
                t.auth_tag_output_len = req;
                let k = fixed_key::<16>(key).ok_or_else(|| invalid_key(xform.algo, key.len()))?;
                draft.keys.auth = if *self == AuthFamily::Snow3g { AuthKey::Snow3g(k) } else { AuthKey::Kasumi(k) };
            }

            AuthFamily::Hmac(f, alg) => {
                t.hash_alg = alg;
                t.auth_tag_output_len = hash_tag_len(alg, req)?;
                draft.keys.auth = AuthKey::hmac(f, key);
            }

            AuthFamily::Plain(_, alg) => {
                t.hash_alg = alg;
                t.auth_tag_output_len = hash_tag_len(alg, req)?;
            }
        }
        Ok(())
    }
}

/// Auth step of a session; no transform means the NULL hash.
pub fn compile_auth(xform: Option<&AuthXform>, draft: &mut SessionDraft) -> Result<(), SessionError> {
    let Some(xform) = xform else {
        draft.template.hash_alg = HashAlg::Null;
        return Ok(());
    };
    AuthFamily::classify(xform.algo)?.compile(xform, draft)
}
