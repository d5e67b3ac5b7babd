// ## 📂 File: `src/session/types.rs`

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::session::xform::{AuthOp, IvParam, XformKind};

/// Configuration errors. All of them abort session creation and none are retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unsupported operation chain: {0}")]
    UnsupportedChain(&'static str),

    #[error("invalid xform type: expected {expected}, got {actual}")]
    InvalidXformType { expected: XformKind, actual: XformKind },

    #[error("unsupported cipher algorithm: {0}")]
    UnsupportedCipher(String),

    #[error("unsupported auth algorithm: {0}")]
    UnsupportedAuth(String),

    #[error("unsupported aead algorithm: {0}")]
    UnsupportedAead(String),

    #[error("invalid key length for {algo}: {actual} bytes")]
    InvalidKeyLen { algo: String, actual: usize },

    #[error("invalid digest length for {algo}: {requested} bytes")]
    InvalidDigestLen { algo: String, requested: u16 },

    #[error("invalid DOCSIS security configuration: {0}")]
    InvalidDocsis(&'static str),

    #[error("key expansion failed: {0}")]
    KeyExpansion(#[from] CryptoError),

    #[error("session has been cleared")]
    Cleared,
}

/// Per-session parameters that live outside the job template.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionParams {
    /// `None` when the chain carries no authentication step.
    pub auth_op: Option<AuthOp>,
    /// Digest length the caller asked for.
    pub req_digest_len: u16,
    /// Cipher / AEAD IV (for GMAC: the auth IV).
    pub iv: IvParam,
    /// Auth IV offset (ZUC-EIA3, SNOW3G-UIA2, GMAC).
    pub auth_iv_offset: u16,
}

impl SessionParams {
    pub fn is_verify(&self) -> bool {
        self.auth_op == Some(AuthOp::Verify)
    }
}
