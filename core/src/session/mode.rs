// ## 📂 File: `src/session/mode.rs`

//! session/mode.rs
//! Transform chain parsing and processing order.
//!
//! Accepted shapes:
//! - cipher alone, auth alone, AEAD alone
//! - cipher -> auth: encrypt + generate, or decrypt + verify
//! - auth -> cipher: verify + decrypt, or generate + encrypt

use crate::job::types::ChainOrder;
use crate::session::types::SessionError;
use crate::session::xform::{AeadOp, AeadXform, AuthOp, AuthXform, CipherOp, CipherXform, Xform};

/// Operation mode resolved from a transform chain.
#[derive(Copy, Clone, Debug)]
pub enum ChainMode<'a> {
    EncryptOnly(&'a CipherXform),
    DecryptOnly(&'a CipherXform),
    HashGenOnly(&'a AuthXform),
    HashVerifyOnly(&'a AuthXform),
    EncryptThenHashGen(&'a CipherXform, &'a AuthXform),
    DecryptThenHashVerify(&'a CipherXform, &'a AuthXform),
    HashVerifyThenDecrypt(&'a AuthXform, &'a CipherXform),
    HashGenThenEncrypt(&'a AuthXform, &'a CipherXform),
    AeadEncrypt(&'a AeadXform),
    AeadDecrypt(&'a AeadXform),
}

impl<'a> ChainMode<'a> {
    pub fn parse(chain: &'a [Xform]) -> Result<Self, SessionError> {
        match chain {
            [] => Err(SessionError::UnsupportedChain("empty transform chain")),
            [Xform::Cipher(c)] => Ok(match c.op {
                CipherOp::Encrypt => ChainMode::EncryptOnly(c),
                CipherOp::Decrypt => ChainMode::DecryptOnly(c),
            }),
            [Xform::Auth(a)] => Ok(match a.op {
                AuthOp::Generate => ChainMode::HashGenOnly(a),
                AuthOp::Verify => ChainMode::HashVerifyOnly(a),
            }),
            [Xform::Aead(x)] => Ok(match x.op {
                AeadOp::Encrypt => ChainMode::AeadEncrypt(x),
                AeadOp::Decrypt => ChainMode::AeadDecrypt(x),
            }),
            [Xform::Cipher(c), Xform::Auth(a)] => match (c.op, a.op) {
                (CipherOp::Encrypt, AuthOp::Generate) => Ok(ChainMode::EncryptThenHashGen(c, a)),
                (CipherOp::Decrypt, AuthOp::Verify) => Ok(ChainMode::DecryptThenHashVerify(c, a)),
                _ => Err(SessionError::UnsupportedChain("cipher then auth must be encrypt+generate or decrypt+verify")),
            },
            [Xform::Auth(a), Xform::Cipher(c)] => match (a.op, c.op) {
                (AuthOp::Verify, CipherOp::Decrypt) => Ok(ChainMode::HashVerifyThenDecrypt(a, c)),
                (AuthOp::Generate, CipherOp::Encrypt) => Ok(ChainMode::HashGenThenEncrypt(a, c)),
                _ => Err(SessionError::UnsupportedChain("auth then cipher must be verify+decrypt or generate+encrypt")),
            },
            [Xform::Aead(_), _] | [_, Xform::Aead(_)] => {
                Err(SessionError::UnsupportedChain("aead cannot be combined with other transforms"))
            }
            [Xform::Cipher(_), Xform::Cipher(_)] => Err(SessionError::UnsupportedChain("more than one cipher transform")),
            [Xform::Auth(_), Xform::Auth(_)] => Err(SessionError::UnsupportedChain("more than one auth transform")),
            _ => Err(SessionError::UnsupportedChain("more than two transforms")),
        }
    }

    /// Processing order. Pure encryption runs cipher first, pure decryption last.
    pub fn chain_order(&self) -> ChainOrder {
        match self {
            ChainMode::HashVerifyThenDecrypt(..)
            | ChainMode::HashGenOnly(_)
            | ChainMode::HashVerifyOnly(_)
            | ChainMode::HashGenThenEncrypt(..)
            | ChainMode::DecryptOnly(_)
            | ChainMode::AeadDecrypt(_) => ChainOrder::HashCipher,
            ChainMode::EncryptThenHashGen(..)
            | ChainMode::DecryptThenHashVerify(..)
            | ChainMode::EncryptOnly(_)
            | ChainMode::AeadEncrypt(_) => ChainOrder::CipherHash,
        }
    }

    pub fn auth(&self) -> Option<&'a AuthXform> {
        match *self {
            ChainMode::HashGenOnly(a)
            | ChainMode::HashVerifyOnly(a)
            | ChainMode::EncryptThenHashGen(_, a)
            | ChainMode::DecryptThenHashVerify(_, a)
            | ChainMode::HashVerifyThenDecrypt(a, _)
            | ChainMode::HashGenThenEncrypt(a, _) => Some(a),
            _ => None,
        }
    }

    pub fn cipher(&self) -> Option<&'a CipherXform> {
        match *self {
            ChainMode::EncryptOnly(c)
            | ChainMode::DecryptOnly(c)
            | ChainMode::EncryptThenHashGen(c, _)
            | ChainMode::DecryptThenHashVerify(c, _)
            | ChainMode::HashVerifyThenDecrypt(_, c)
            | ChainMode::HashGenThenEncrypt(_, c) => Some(c),
            _ => None,
        }
    }

    pub fn aead(&self) -> Option<&'a AeadXform> {
        match *self {
            ChainMode::AeadEncrypt(x) | ChainMode::AeadDecrypt(x) => Some(x),
            _ => None,
        }
    }
}
