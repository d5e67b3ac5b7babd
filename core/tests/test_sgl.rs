
// # 🧪 Multi-segment operations
//
// Native GCM segment lists, the INIT/UPDATE/COMPLETE stream and the
// linearized fallback, each checked against a contiguous reference.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use mb_offload_core::config::DriverConfig;
use mb_offload_core::mbuf::{BufHandle, Mbuf};
use mb_offload_core::op::{CryptoOp, OpSession, OpStatus};
use mb_offload_core::queue::QueuePair;
use mb_offload_core::session::xform::{AeadAlgo, AeadOp, AuthAlgo, AuthOp, CipherAlgo, CipherOp, IvParam, Xform};
use proptest::prelude::*;

const IV_OFF: u16 = 16;
const KEY: [u8; 32] = [0x4b; 32];
const NONCE: [u8; 12] = [0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac];
const AAD: [u8; 16] = [0xfe; 16];

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

fn run_one(qp: &mut QueuePair, op: CryptoOp) -> Box<CryptoOp> {
    let mut ops = vec![Box::new(op)];
    assert_eq!(qp.enqueue_burst(&mut ops), 1);
    let mut done = drain(qp, 1);
    assert_eq!(done.len(), 1);
    done.remove(0)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn gcm_reference(plain: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let cipher = Aes256Gcm::new_from_slice(&KEY).unwrap();
    let mut buf = plain.to_vec();
    let tag = cipher.encrypt_in_place_detached(Nonce::from_slice(&NONCE), &AAD, &mut buf).unwrap();
    (buf, tag.to_vec())
}

fn gcm_op(qp: &mut QueuePair, op: AeadOp, src: Mbuf, len: u32, digest: &BufHandle) -> CryptoOp {
    let sess = qp
        .create_session(&[Xform::aead(AeadAlgo::AesGcm, op, &KEY, IvParam::new(IV_OFF, 12), 16, AAD.len() as u16)])
        .unwrap();
    CryptoOp::new(OpSession::Session(sess), src)
        .with_aead(0, len)
        .with_aad(BufHandle::from_vec(AAD.to_vec()).at(0))
        .with_aead_digest(digest.at(0))
        .with_iv(IV_OFF, &NONCE)
}

// ## 1️⃣ Native GCM segment list

#[test]
fn gcm_three_segments_in_place_matches_reference() {
    let mut qp = QueuePair::software(0, DriverConfig::default()).unwrap();
    let plain = payload(1500);
    let src = Mbuf::split(&plain, &[500, 600, 400]);
    assert_eq!(src.nb_segs(), 3);

    let digest = BufHandle::zeroed(16);
    let op = gcm_op(&mut qp, AeadOp::Encrypt, src.clone(), 1500, &digest);
    let done = run_one(&mut qp, op);
    assert_eq!(done.status, OpStatus::Success);

    let (ct, tag) = gcm_reference(&plain);
    assert_eq!(src.to_vec(), ct);
    assert_eq!(digest.to_vec(), tag);
    assert_eq!(qp.stats().sgl_native, 1);
    assert_eq!(qp.stats().sgl_linearized, 0);
}

#[test]
fn gcm_segment_list_decrypt_verifies() {
    let mut qp = QueuePair::software(0, DriverConfig::default()).unwrap();
    let plain = payload(700);
    let (ct, tag) = gcm_reference(&plain);

    let src = Mbuf::split(&ct, &[100, 250]);
    let digest = BufHandle::from_vec(tag.clone());
    let op = gcm_op(&mut qp, AeadOp::Decrypt, src.clone(), 700, &digest);
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);
    assert_eq!(src.to_vec(), plain);

    let mut bad = ct.clone();
    bad[650] ^= 0x04;
    let src = Mbuf::split(&bad, &[100, 250]);
    let op = gcm_op(&mut qp, AeadOp::Decrypt, src, 700, &BufHandle::from_vec(tag));
    assert_eq!(run_one(&mut qp, op).status, OpStatus::AuthFailed);
}

#[test]
fn gcm_out_of_place_segment_lists() {
    let mut qp = QueuePair::software(0, DriverConfig::default()).unwrap();
    let plain = payload(300);
    let src = Mbuf::split(&plain, &[64, 64]);
    let dst = Mbuf::split(&vec![0; 300], &[100]);

    let digest = BufHandle::zeroed(16);
    let op = gcm_op(&mut qp, AeadOp::Encrypt, src.clone(), 300, &digest).with_dst(dst.clone());
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);

    let (ct, tag) = gcm_reference(&plain);
    assert_eq!(src.to_vec(), plain);
    assert_eq!(dst.to_vec(), ct);
    assert_eq!(digest.to_vec(), tag);
}

// ## 2️⃣ More segments than one job can carry

#[test]
fn gcm_multi_job_stream_matches_reference() {
    let cfg = DriverConfig { max_sgl_segs: 2, ..DriverConfig::default() };
    let mut qp = QueuePair::software(0, cfg).unwrap();
    let plain = payload(1000);
    let src = Mbuf::split(&plain, &[200, 200, 200, 200]);
    assert_eq!(src.nb_segs(), 5);

    let digest = BufHandle::zeroed(16);
    let op = gcm_op(&mut qp, AeadOp::Encrypt, src.clone(), 1000, &digest);
    let done = run_one(&mut qp, op);
    assert_eq!(done.status, OpStatus::Success);

    let (ct, tag) = gcm_reference(&plain);
    assert_eq!(src.to_vec(), ct);
    assert_eq!(digest.to_vec(), tag);
    // Sub-jobs carry no operation, only the final one comes back.
    assert_eq!(qp.stats().dequeued_count, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_gcm_segmentation_does_not_change_output(
        len in 1usize..600,
        cuts in proptest::collection::vec(1usize..200, 0..6),
    ) {
        let cfg = DriverConfig { max_sgl_segs: 3, ..DriverConfig::default() };
        let mut qp = QueuePair::software(0, cfg).unwrap();
        let plain = payload(len);
        let src = Mbuf::split(&plain, &cuts);

        let digest = BufHandle::zeroed(16);
        let op = gcm_op(&mut qp, AeadOp::Encrypt, src.clone(), len as u32, &digest);
        let done = run_one(&mut qp, op);
        prop_assert_eq!(done.status, OpStatus::Success);

        let (ct, tag) = gcm_reference(&plain);
        prop_assert_eq!(src.to_vec(), ct);
        prop_assert_eq!(digest.to_vec(), tag);
    }
}

// ## 3️⃣ Linearized cipher + hash

fn cbc_sha1_op(qp: &mut QueuePair, src: Mbuf, dst: Option<Mbuf>, digest: &BufHandle) -> CryptoOp {
    let sess = qp
        .create_session(&[
            Xform::cipher(CipherAlgo::AesCbc, CipherOp::Encrypt, &[0x61; 16], IvParam::new(IV_OFF, 16)),
            Xform::auth(AuthAlgo::Sha1Hmac, AuthOp::Generate, &[0x62; 20], 12),
        ])
        .unwrap();
    let op = CryptoOp::new(OpSession::Session(sess), src)
        .with_cipher(16, 128)
        .with_auth(0, 144)
        .with_auth_digest(digest.at(0))
        .with_iv(IV_OFF, &[0x63; 16]);
    match dst {
        Some(d) => op.with_dst(d),
        None => op,
    }
}

#[test]
fn linearized_chain_matches_contiguous() {
    let mut qp = QueuePair::software(0, DriverConfig::default()).unwrap();
    let plain = payload(144);

    let flat = Mbuf::contiguous(plain.clone());
    let flat_digest = BufHandle::zeroed(12);
    let op = cbc_sha1_op(&mut qp, flat.clone(), None, &flat_digest);
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);

    let chained = Mbuf::split(&plain, &[50, 50]);
    let chained_digest = BufHandle::zeroed(12);
    let op = cbc_sha1_op(&mut qp, chained.clone(), None, &chained_digest);
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);

    assert_eq!(chained.to_vec(), flat.to_vec());
    assert_eq!(chained_digest.to_vec(), flat_digest.to_vec());
    assert_eq!(qp.stats().sgl_linearized, 1);
}

#[test]
fn linearized_out_of_place_scatters_to_destination() {
    let mut qp = QueuePair::software(0, DriverConfig::default()).unwrap();
    let plain = payload(144);

    let flat = Mbuf::contiguous(plain.clone());
    let flat_digest = BufHandle::zeroed(12);
    let op = cbc_sha1_op(&mut qp, flat.clone(), None, &flat_digest);
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);

    let src = Mbuf::contiguous(plain.clone());
    let dst = Mbuf::split(&vec![0; 144], &[40, 40, 40]);
    let digest = BufHandle::zeroed(12);
    let op = cbc_sha1_op(&mut qp, src.clone(), Some(dst.clone()), &digest);
    assert_eq!(run_one(&mut qp, op).status, OpStatus::Success);

    assert_eq!(src.to_vec(), plain);
    assert_eq!(&dst.to_vec()[16..], &flat.to_vec()[16..]);
    assert_eq!(digest.to_vec(), flat_digest.to_vec());
}
