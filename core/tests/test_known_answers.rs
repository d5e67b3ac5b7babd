
// # 🧪 Published vectors through the queue pair
//
// CCM, AES-XCBC-MAC-96, CMAC, GMAC and ChaCha20-Poly1305 run end to end:
// session compile, job build, software accelerator, post-processing.

use std::sync::Arc;

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use chacha20poly1305::ChaCha20Poly1305;
use mb_offload_core::config::DriverConfig;
use mb_offload_core::mbuf::{BufHandle, Mbuf};
use mb_offload_core::op::{CryptoOp, OpSession, OpStatus};
use mb_offload_core::queue::QueuePair;
use mb_offload_core::session::template::Session;
use mb_offload_core::session::xform::{AeadAlgo, AeadOp, AuthAlgo, AuthOp, IvParam, Xform};

const IV_OFF: u16 = 16;

fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

fn drain(qp: &mut QueuePair, n: usize) -> Vec<Box<CryptoOp>> {
    let mut out = Vec::new();
    for _ in 0..64 {
        if out.len() >= n {
            break;
        }
        out.extend(qp.dequeue_burst(n - out.len()));
    }
    out
}

fn run_one(qp: &mut QueuePair, op: CryptoOp) -> OpStatus {
    let mut ops = vec![Box::new(op)];
    assert_eq!(qp.enqueue_burst(&mut ops), 1);
    let done = drain(qp, 1);
    assert_eq!(done.len(), 1);
    done[0].status
}

fn qp() -> QueuePair {
    QueuePair::software(0, DriverConfig::default()).unwrap()
}

// ## 1️⃣ AES-CCM (RFC 3610 packet vector #1)

const CCM_NONCE: &str = "00000003020100a0a1a2a3a4a5";
const CCM_CT: &str = "588c979a61c663d2f066d0c2c0f989806d5f6b61dac384";
const CCM_TAG: &str = "17e8d12cfdf926e0";

fn ccm_op(qp: &mut QueuePair, op: AeadOp, packet: &Mbuf, digest: &BufHandle) -> CryptoOp {
    let key: Vec<u8> = (0xc0..=0xcfu8).collect();
    let sess = qp.create_session(&[Xform::aead(AeadAlgo::AesCcm, op, &key, IvParam::new(IV_OFF, 13), 8, 8)]).unwrap();

    // AAD sits after the 18 bytes reserved for B0 and the encoded length.
    let mut aad = vec![0u8; 18];
    aad.extend(0..8u8);
    // Nonce follows the one-byte flags field.
    let mut iv = vec![0u8];
    iv.extend(unhex(CCM_NONCE));

    CryptoOp::new(OpSession::Session(sess), packet.clone())
        .with_aead(8, 23)
        .with_aad(BufHandle::from_vec(aad).at(0))
        .with_aead_digest(digest.at(0))
        .with_iv(IV_OFF, &iv)
}

#[test]
fn ccm_encrypt_matches_rfc3610() {
    let mut qp = qp();
    let plain: Vec<u8> = (0..0x1fu8).collect();
    let packet = Mbuf::contiguous(plain.clone());
    let digest = BufHandle::zeroed(8);

    let op = ccm_op(&mut qp, AeadOp::Encrypt, &packet, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);

    let out = packet.to_vec();
    assert_eq!(&out[..8], &plain[..8]);
    assert_eq!(&out[8..], &unhex(CCM_CT)[..]);
    assert_eq!(digest.to_vec(), unhex(CCM_TAG));
}

#[test]
fn ccm_decrypt_verifies_rfc3610_tag() {
    let mut qp = qp();
    let mut wire: Vec<u8> = (0..8u8).collect();
    wire.extend(unhex(CCM_CT));

    let packet = Mbuf::contiguous(wire.clone());
    let op = ccm_op(&mut qp, AeadOp::Decrypt, &packet, &BufHandle::from_vec(unhex(CCM_TAG)));
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);
    assert_eq!(packet.to_vec(), (0..0x1fu8).collect::<Vec<u8>>());

    let mut bad_tag = unhex(CCM_TAG);
    bad_tag[0] ^= 0x80;
    let op = ccm_op(&mut qp, AeadOp::Decrypt, &Mbuf::contiguous(wire), &BufHandle::from_vec(bad_tag));
    assert_eq!(run_one(&mut qp, op), OpStatus::AuthFailed);
}

// ## 2️⃣ AES-XCBC-MAC-96 (RFC 3566) and AES-CMAC (RFC 4493)

fn mac_op(sess: &Arc<Session>, msg: &[u8], digest: &BufHandle) -> CryptoOp {
    CryptoOp::new(OpSession::Session(sess.clone()), Mbuf::contiguous(msg.to_vec()))
        .with_auth(0, msg.len() as u32)
        .with_auth_digest(digest.at(0))
}

#[test]
fn xcbc_mac_96_matches_rfc3566() {
    let mut qp = qp();
    let key: Vec<u8> = (0..16u8).collect();
    let gen = qp.create_session(&[Xform::auth(AuthAlgo::AesXcbcMac, AuthOp::Generate, &key, 12)]).unwrap();
    let ver = qp.create_session(&[Xform::auth(AuthAlgo::AesXcbcMac, AuthOp::Verify, &key, 12)]).unwrap();

    for (len, mac) in [(3usize, "5b376580ae2f19afe7219ceef172756f"), (16, "d2a246fa349b68a79998a4394ff7a263")] {
        let msg: Vec<u8> = (0..len as u8).collect();
        let digest = BufHandle::zeroed(12);
        assert_eq!(run_one(&mut qp, mac_op(&gen, &msg, &digest)), OpStatus::Success);
        assert_eq!(digest.to_vec(), unhex(mac)[..12].to_vec(), "len {}", len);

        assert_eq!(run_one(&mut qp, mac_op(&ver, &msg, &digest)), OpStatus::Success);
    }
}

const CMAC_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const CMAC_MSG: &str = concat!(
    "6bc1bee22e409f96e93d7e117393172a",
    "ae2d8a571e03ac9c9eb76fac45af8e51",
    "30c81c46a35ce411e5fbc1191a0a52ef",
    "f69f2445df4f9b17ad2b417be66c3710",
);

#[test]
fn cmac_matches_rfc4493() {
    let mut qp = qp();
    let sess = qp.create_session(&[Xform::auth(AuthAlgo::AesCmac, AuthOp::Generate, &unhex(CMAC_KEY), 16)]).unwrap();
    let msg = unhex(CMAC_MSG);

    for (len, tag) in [
        (16, "070a16b46b4d4144f79bdd9dd04a287c"),
        (40, "dfa66747de9ae63030ca32611497c827"),
        (64, "51f0bebf7e3b9d92fc49741779363cfe"),
    ] {
        let digest = BufHandle::zeroed(16);
        assert_eq!(run_one(&mut qp, mac_op(&sess, &msg[..len], &digest)), OpStatus::Success);
        assert_eq!(digest.to_vec(), unhex(tag), "len {}", len);
    }
}

#[test]
fn cmac_truncated_tag_verifies() {
    let mut qp = qp();
    let key = unhex(CMAC_KEY);
    let ver = qp.create_session(&[Xform::auth(AuthAlgo::AesCmac, AuthOp::Verify, &key, 4)]).unwrap();
    let msg = unhex(CMAC_MSG);

    let good = BufHandle::from_vec(unhex("51f0bebf"));
    assert_eq!(run_one(&mut qp, mac_op(&ver, &msg, &good)), OpStatus::Success);
    let bad = BufHandle::from_vec(unhex("51f0bebe"));
    assert_eq!(run_one(&mut qp, mac_op(&ver, &msg, &bad)), OpStatus::AuthFailed);
}

// ## 3️⃣ AES-GMAC

fn gmac_op(qp: &mut QueuePair, op: AuthOp, key: &[u8], msg: &[u8], digest: &BufHandle) -> CryptoOp {
    let sess = qp
        .create_session(&[Xform::auth_with_iv(AuthAlgo::AesGmac, op, key, IvParam::new(IV_OFF, 12), 16)])
        .unwrap();
    CryptoOp::new(OpSession::Session(sess), Mbuf::contiguous(msg.to_vec()))
        .with_auth(0, msg.len() as u32)
        .with_auth_digest(digest.at(0))
        .with_iv(IV_OFF, &[0u8; 12])
}

#[test]
fn gmac_empty_message_matches_gcm_zero_vectors() {
    let mut qp = qp();
    for (key_len, tag) in [
        (16, "58e2fccefa7e3061367f1d57a4e7455a"),
        (24, "cd33b28ac773f74ba00ed1f312572435"),
        (32, "530f8afbc74536b9a963b4f1c4cb738b"),
    ] {
        let digest = BufHandle::zeroed(16);
        let op = gmac_op(&mut qp, AuthOp::Generate, &vec![0u8; key_len], &[], &digest);
        assert_eq!(run_one(&mut qp, op), OpStatus::Success);
        assert_eq!(digest.to_vec(), unhex(tag), "key {}", key_len);
    }
}

#[test]
fn gmac_message_matches_gcm_with_empty_payload() {
    let mut qp = qp();
    let key = [0x6e; 16];
    let msg: Vec<u8> = (0..77u8).collect();

    let mut empty = [0u8; 0];
    let expected = Aes128Gcm::new_from_slice(&key)
        .unwrap()
        .encrypt_in_place_detached(Nonce::from_slice(&[0u8; 12]), &msg, &mut empty)
        .unwrap()
        .to_vec();

    let digest = BufHandle::zeroed(16);
    let op = gmac_op(&mut qp, AuthOp::Generate, &key, &msg, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);
    assert_eq!(digest.to_vec(), expected);

    let op = gmac_op(&mut qp, AuthOp::Verify, &key, &msg, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);

    let mut tampered = msg.clone();
    tampered[40] ^= 1;
    let op = gmac_op(&mut qp, AuthOp::Verify, &key, &tampered, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::AuthFailed);
}

// ## 4️⃣ ChaCha20-Poly1305 (RFC 8439 section 2.8.2), flat and segmented

const SUNSCREEN: &[u8] =
    b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";
const CHACHA_NONCE: &str = "070000004041424344454647";
const CHACHA_AAD: &str = "50515253c0c1c2c3c4c5c6c7";
const CHACHA_TAG: &str = "1ae10b594f09e26a7e902ecbd0600691";

fn chacha_key() -> Vec<u8> {
    (0x80..=0x9fu8).collect()
}

fn chacha_reference() -> Vec<u8> {
    let mut buf = SUNSCREEN.to_vec();
    ChaCha20Poly1305::new_from_slice(&chacha_key())
        .unwrap()
        .encrypt_in_place_detached(unhex(CHACHA_NONCE).as_slice().into(), &unhex(CHACHA_AAD), &mut buf)
        .unwrap();
    buf
}

fn chacha_op(qp: &mut QueuePair, op: AeadOp, src: &Mbuf, digest: &BufHandle) -> CryptoOp {
    let sess = qp
        .create_session(&[Xform::aead(AeadAlgo::Chacha20Poly1305, op, &chacha_key(), IvParam::new(IV_OFF, 12), 16, 12)])
        .unwrap();
    CryptoOp::new(OpSession::Session(sess), src.clone())
        .with_aead(0, SUNSCREEN.len() as u32)
        .with_aad(BufHandle::from_vec(unhex(CHACHA_AAD)).at(0))
        .with_aead_digest(digest.at(0))
        .with_iv(IV_OFF, &unhex(CHACHA_NONCE))
}

#[test]
fn chacha20_poly1305_flat_matches_rfc8439() {
    let mut qp = qp();
    let src = Mbuf::contiguous(SUNSCREEN.to_vec());
    let digest = BufHandle::zeroed(16);

    let op = chacha_op(&mut qp, AeadOp::Encrypt, &src, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);

    let ct = src.to_vec();
    assert_eq!(&ct[..16], &unhex("d31a8d34648e60db7b86afbc53ef7ec2")[..]);
    assert_eq!(ct, chacha_reference());
    assert_eq!(digest.to_vec(), unhex(CHACHA_TAG));
    assert_eq!(qp.stats().sgl_native, 0);
}

#[test]
fn chacha20_poly1305_segmented_matches_flat() {
    let mut qp = qp();
    let src = Mbuf::split(SUNSCREEN, &[40, 50]);
    assert_eq!(src.nb_segs(), 2);
    let digest = BufHandle::zeroed(16);

    let op = chacha_op(&mut qp, AeadOp::Encrypt, &src, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);
    assert_eq!(src.to_vec(), chacha_reference());
    assert_eq!(digest.to_vec(), unhex(CHACHA_TAG));
    assert_eq!(qp.stats().sgl_native, 1);

    let op = chacha_op(&mut qp, AeadOp::Decrypt, &src, &digest);
    assert_eq!(run_one(&mut qp, op), OpStatus::Success);
    assert_eq!(src.to_vec(), SUNSCREEN.to_vec());
}

#[test]
fn chacha20_poly1305_rejects_wrong_tag() {
    let mut qp = qp();
    let src = Mbuf::contiguous(chacha_reference());
    let mut tag = unhex(CHACHA_TAG);
    tag[15] ^= 0x01;

    let op = chacha_op(&mut qp, AeadOp::Decrypt, &src, &BufHandle::from_vec(tag));
    assert_eq!(run_one(&mut qp, op), OpStatus::AuthFailed);
}
