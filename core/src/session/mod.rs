// ## 📂 File: `src/session/mod.rs`

//! Session compiler: transform chain in, immutable job template out.
//!
//! Design notes:
//! - Each algorithm family is a closed enum variant with one `compile` step
//!   (`ParamCompiler`), applied in the fixed order auth, cipher, aead.
//! - All key expansion and precompute runs here, never per operation.

pub mod aead;
pub mod auth;
pub mod cipher;
pub mod docsis;
pub mod keys;
pub mod mode;
pub mod template;
pub mod types;
pub mod xform;

pub use keys::{AuthKey, CipherKey, GcmKey, SessionKeys};
pub use mode::ChainMode;
pub use template::{compile, compile_docsis, JobTemplate, Session, SessionKind, SessionPool};
pub use types::{SessionError, SessionParams};
pub use xform::*;

/// Template and parameters while a session is being compiled.
#[derive(Debug, Default)]
pub struct SessionDraft {
    pub template: JobTemplate,
    pub params: SessionParams,
    pub keys: SessionKeys,
}

/// Uniform compile step implemented by every algorithm family.
pub trait ParamCompiler {
    type Xform;

    fn compile(&self, xform: &Self::Xform, draft: &mut SessionDraft) -> Result<(), SessionError>;
}

pub(crate) fn invalid_key(algo: impl std::fmt::Debug, actual: usize) -> SessionError {
    SessionError::InvalidKeyLen { algo: format!("{:?}", algo), actual }
}

pub(crate) fn invalid_digest(algo: impl std::fmt::Debug, requested: u16) -> SessionError {
    SessionError::InvalidDigestLen { algo: format!("{:?}", algo), requested }
}
