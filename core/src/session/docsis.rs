// ## 📂 File: `src/session/docsis.rs`

//! session/docsis.rs
//! DOCSIS lookaside-protocol sessions: AES-DOCSIS-BPI plus an implicit CRC32.
//!
//! Downlink: CRC generate, then encrypt (hash-then-cipher).
//! Uplink: decrypt, then CRC verify (cipher-then-hash).

use crate::constants::key_sizes::{KEY_128, KEY_256};
use crate::constants::{AES_BLOCK_SIZE, ETHER_CRC_LEN};
use crate::job::types::{ChainOrder, HashAlg};
use crate::session::cipher::compile_cipher;
use crate::session::types::SessionError;
use crate::session::xform::{AuthOp, CipherAlgo, CipherOp, CipherXform, DocsisConf, DocsisDirection, Xform, XformKind};
use crate::session::SessionDraft;

/// Validate the security configuration and return its single cipher transform.
pub fn check_docsis(conf: &DocsisConf) -> Result<&CipherXform, SessionError> {
    let cipher = match conf.crypto.as_slice() {
        [] => return Err(SessionError::InvalidDocsis("missing cipher transform")),
        [Xform::Cipher(c)] => c,
        [other] => return Err(SessionError::InvalidXformType { expected: XformKind::Cipher, actual: other.kind() }),
        _ => return Err(SessionError::InvalidDocsis("exactly one cipher transform is allowed")),
    };

    let expected_op = match conf.direction {
        DocsisDirection::Downlink => CipherOp::Encrypt,
        DocsisDirection::Uplink => CipherOp::Decrypt,
    };
    if cipher.op != expected_op {
        return Err(SessionError::InvalidDocsis("cipher direction does not match DOCSIS direction"));
    }
    if cipher.algo != CipherAlgo::AesDocsisBpi {
        return Err(SessionError::InvalidDocsis("cipher must be AES-DOCSIS-BPI"));
    }
    if !matches!(cipher.key.len(), KEY_128 | KEY_256) {
        return Err(SessionError::InvalidDocsis("key must be 128 or 256 bits"));
    }
    if cipher.iv.length as usize != AES_BLOCK_SIZE {
        return Err(SessionError::InvalidDocsis("IV must be one AES block"));
    }
    Ok(cipher)
}

/// Fill `draft` for a DOCSIS security session.
pub fn compile_docsis_params(conf: &DocsisConf, draft: &mut SessionDraft) -> Result<(), SessionError> {
    let cipher = check_docsis(conf)?;

    let (order, op) = match conf.direction {
        DocsisDirection::Uplink => (ChainOrder::CipherHash, AuthOp::Verify),
        DocsisDirection::Downlink => (ChainOrder::HashCipher, AuthOp::Generate),
    };
    draft.template.chain_order = order;
    draft.template.iv_len = 0;

    draft.template.hash_alg = HashAlg::DocsisCrc32;
    draft.params.auth_op = Some(op);
    draft.params.req_digest_len = ETHER_CRC_LEN as u16;
    draft.template.auth_tag_output_len = ETHER_CRC_LEN as u16;

    compile_cipher(Some(cipher), draft)
}
