
// # 🧪 Session compiler test suite
//
// Key and digest allow-lists, chain parsing, DOCSIS checks, pool and clear.

use mb_offload_core::capabilities::{find, AlgoId};
use mb_offload_core::job::types::{ChainOrder, CipherDirection, CipherMode, HashAlg};
use mb_offload_core::session::template::{compile, compile_docsis, SessionPool};
use mb_offload_core::session::types::SessionError;
use mb_offload_core::session::xform::{
    AeadAlgo, AeadOp, AuthAlgo, AuthOp, CipherAlgo, CipherOp, DocsisConf, DocsisDirection, IvParam, Xform,
};
use proptest::prelude::*;

fn cbc(key_len: usize) -> Vec<Xform> {
    vec![Xform::cipher(CipherAlgo::AesCbc, CipherOp::Encrypt, &vec![0x11; key_len], IvParam::new(0, 16))]
}

fn gcm(key_len: usize, digest: u16) -> Vec<Xform> {
    vec![Xform::aead(AeadAlgo::AesGcm, AeadOp::Encrypt, &vec![0x22; key_len], IvParam::new(0, 12), digest, 16)]
}

fn ccm(digest: u16) -> Vec<Xform> {
    vec![Xform::aead(AeadAlgo::AesCcm, AeadOp::Encrypt, &[0x33; 16], IvParam::new(0, 13), digest, 8)]
}

fn hmac(algo: AuthAlgo, digest: u16) -> Vec<Xform> {
    vec![Xform::auth(algo, AuthOp::Generate, b"secret-key", digest)]
}

// ## 1️⃣ Key length allow-lists

proptest! {
    #[test]
    fn prop_aes_cbc_key_allow_list(len in 0usize..48) {
        let ok = compile(&cbc(len)).is_ok();
        prop_assert_eq!(ok, matches!(len, 16 | 24 | 32));
    }

    #[test]
    fn prop_aes_gcm_key_allow_list(len in 0usize..48) {
        let res = compile(&gcm(len, 16));
        prop_assert_eq!(res.is_ok(), matches!(len, 16 | 24 | 32));
        if let Err(e) = res {
            let is_key_err = matches!(e, SessionError::InvalidKeyLen { .. });
            prop_assert!(is_key_err);
        }
    }

    #[test]
    fn prop_chacha_key_must_be_32(len in 0usize..48) {
        let chain = vec![Xform::aead(
            AeadAlgo::Chacha20Poly1305, AeadOp::Encrypt, &vec![1u8; len], IvParam::new(0, 12), 16, 0,
        )];
        prop_assert_eq!(compile(&chain).is_ok(), len == 32);
    }

    #[test]
    fn prop_docsis_cipher_keys(len in 0usize..48) {
        let chain = vec![Xform::cipher(CipherAlgo::AesDocsisBpi, CipherOp::Encrypt, &vec![5u8; len], IvParam::new(0, 16))];
        prop_assert_eq!(compile(&chain).is_ok(), matches!(len, 16 | 32));
    }

    #[test]
    fn prop_capability_table_matches_cbc_compiler(len in 0usize..48) {
        let cap = find(AlgoId::Cipher(CipherAlgo::AesCbc)).unwrap();
        prop_assert_eq!(cap.key.contains(len), compile(&cbc(len)).is_ok());
    }
}

// ## 2️⃣ Digest length allow-lists

proptest! {
    #[test]
    fn prop_ccm_digest_even_within_range(d in 0u16..24) {
        let ok = compile(&ccm(d)).is_ok();
        prop_assert_eq!(ok, (4..=16).contains(&d) && d % 2 == 0);
    }

    #[test]
    fn prop_gcm_digest_range(d in 0u16..24) {
        prop_assert_eq!(compile(&gcm(16, d)).is_ok(), (1..=16).contains(&d));
    }

    #[test]
    fn prop_hmac_sha256_digest_range(d in 0u16..48) {
        let res = compile(&hmac(AuthAlgo::Sha256Hmac, d));
        prop_assert_eq!(res.is_ok(), (1..=32).contains(&d));
        if let Ok(s) = res {
            // The accelerator emits the truncated or the full digest only.
            let expected = if d == 16 || d == 32 { d } else { 32 };
            prop_assert_eq!(s.template.auth_tag_output_len, expected);
            prop_assert_eq!(s.params.req_digest_len, d);
        }
    }
}

#[test]
fn hmac_sha256_nonstandard_truncation_requests_full_digest() {
    let s = compile(&hmac(AuthAlgo::Sha256Hmac, 10)).unwrap();
    assert_eq!(s.template.hash_alg, HashAlg::HmacSha256);
    assert_eq!(s.template.auth_tag_output_len, 32);
    assert_eq!(s.params.req_digest_len, 10);
}

#[test]
fn hmac_sha1_standard_truncation_kept() {
    let s = compile(&hmac(AuthAlgo::Sha1Hmac, 12)).unwrap();
    assert_eq!(s.template.auth_tag_output_len, 12);
}

#[test]
fn xcbc_digest_and_key_fixed() {
    let ok = vec![Xform::auth(AuthAlgo::AesXcbcMac, AuthOp::Generate, &[7; 16], 12)];
    assert!(compile(&ok).is_ok());
    let bad_digest = vec![Xform::auth(AuthAlgo::AesXcbcMac, AuthOp::Generate, &[7; 16], 16)];
    assert!(matches!(compile(&bad_digest), Err(SessionError::InvalidDigestLen { .. })));
    let bad_key = vec![Xform::auth(AuthAlgo::AesXcbcMac, AuthOp::Generate, &[7; 24], 12)];
    assert!(matches!(compile(&bad_key), Err(SessionError::InvalidKeyLen { .. })));
}

#[test]
fn cmac_short_digest_uses_full_tag() {
    let chain = vec![Xform::auth(AuthAlgo::AesCmac, AuthOp::Generate, &[9; 16], 2)];
    let s = compile(&chain).unwrap();
    assert_eq!(s.template.auth_tag_output_len, 16);
    assert_eq!(s.params.req_digest_len, 2);
}

#[test]
fn gmac_picks_variant_by_key_length() {
    for (len, alg) in [(16, HashAlg::AesGmac128), (24, HashAlg::AesGmac192), (32, HashAlg::AesGmac256)] {
        let chain = vec![Xform::auth_with_iv(AuthAlgo::AesGmac, AuthOp::Generate, &vec![1; len], IvParam::new(0, 12), 16)];
        let s = compile(&chain).unwrap();
        assert_eq!(s.template.hash_alg, alg);
        assert_eq!(s.template.chain_order, ChainOrder::CipherHash);
        assert_eq!(s.template.cipher_direction, CipherDirection::Encrypt);
    }
}

// ## 3️⃣ Chain parsing

#[test]
fn chain_orders() {
    let key = [0u8; 16];
    let enc = Xform::cipher(CipherAlgo::AesCbc, CipherOp::Encrypt, &key, IvParam::new(0, 16));
    let dec = Xform::cipher(CipherAlgo::AesCbc, CipherOp::Decrypt, &key, IvParam::new(0, 16));
    let gen = Xform::auth(AuthAlgo::Sha1Hmac, AuthOp::Generate, &key, 12);
    let ver = Xform::auth(AuthAlgo::Sha1Hmac, AuthOp::Verify, &key, 12);

    let s = compile(&[enc.clone(), gen.clone()]).unwrap();
    assert_eq!(s.template.chain_order, ChainOrder::CipherHash);
    assert!(!s.params.is_verify());

    let s = compile(&[ver.clone(), dec.clone()]).unwrap();
    assert_eq!(s.template.chain_order, ChainOrder::HashCipher);
    assert!(s.params.is_verify());

    assert!(matches!(compile(&[enc.clone(), ver]), Err(SessionError::UnsupportedChain(_))));
    assert!(matches!(compile(&[gen, dec]), Err(SessionError::UnsupportedChain(_))));
    assert!(matches!(compile(&[enc.clone(), enc]), Err(SessionError::UnsupportedChain(_))));
    assert!(matches!(compile(&[]), Err(SessionError::UnsupportedChain(_))));
}

#[test]
fn aead_cannot_be_chained() {
    let mut chain = gcm(16, 16);
    chain.push(Xform::auth(AuthAlgo::Sha1Hmac, AuthOp::Generate, &[0; 16], 12));
    assert!(compile(&chain).is_err());
}

#[test]
fn aead_decrypt_is_verify() {
    let chain = vec![Xform::aead(AeadAlgo::AesGcm, AeadOp::Decrypt, &[0; 16], IvParam::new(0, 12), 16, 0)];
    let s = compile(&chain).unwrap();
    assert!(s.params.is_verify());
    assert_eq!(s.template.cipher_mode, CipherMode::Gcm);
    assert_eq!(s.template.cipher_direction, CipherDirection::Decrypt);
}

#[test]
fn unsupported_auth_rejected() {
    let chain = vec![Xform::auth(AuthAlgo::Md5, AuthOp::Generate, &[], 16)];
    assert!(matches!(compile(&chain), Err(SessionError::UnsupportedAuth(_))));
}

// ## 4️⃣ DOCSIS security sessions

fn docsis(direction: DocsisDirection, op: CipherOp, key_len: usize, iv_len: u16) -> DocsisConf {
    DocsisConf {
        direction,
        crypto: vec![Xform::cipher(CipherAlgo::AesDocsisBpi, op, &vec![3; key_len], IvParam::new(0, iv_len))],
    }
}

#[test]
fn docsis_directions() {
    let down = compile_docsis(&docsis(DocsisDirection::Downlink, CipherOp::Encrypt, 16, 16)).unwrap();
    assert!(down.is_security());
    assert_eq!(down.template.hash_alg, HashAlg::DocsisCrc32);
    assert_eq!(down.template.chain_order, ChainOrder::HashCipher);
    assert!(!down.params.is_verify());

    let up = compile_docsis(&docsis(DocsisDirection::Uplink, CipherOp::Decrypt, 32, 16)).unwrap();
    assert_eq!(up.template.chain_order, ChainOrder::CipherHash);
    assert!(up.params.is_verify());
}

#[test]
fn docsis_rejections() {
    assert!(compile_docsis(&docsis(DocsisDirection::Downlink, CipherOp::Decrypt, 16, 16)).is_err());
    assert!(compile_docsis(&docsis(DocsisDirection::Downlink, CipherOp::Encrypt, 24, 16)).is_err());
    assert!(compile_docsis(&docsis(DocsisDirection::Downlink, CipherOp::Encrypt, 16, 8)).is_err());
    let empty = DocsisConf { direction: DocsisDirection::Uplink, crypto: vec![] };
    assert!(matches!(compile_docsis(&empty), Err(SessionError::InvalidDocsis(_))));
}

// ## 5️⃣ Clear and pool

#[test]
fn clear_deactivates_session() {
    let mut s = compile(&cbc(16)).unwrap();
    assert!(s.is_active());
    s.clear();
    assert!(!s.is_active());
    assert_eq!(s.template.cipher_mode, CipherMode::Null);
    assert_eq!(s.version, 0);
}

#[test]
fn versions_are_unique() {
    let a = compile(&cbc(16)).unwrap();
    let b = compile(&cbc(16)).unwrap();
    assert_ne!(a.version, b.version);
}

#[test]
fn pool_hands_out_and_takes_back() {
    let pool = SessionPool::new(2);
    let a = pool.take().unwrap();
    let _b = pool.take().unwrap();
    assert!(pool.take().is_none());
    pool.put(a);
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.capacity(), 2);
}
