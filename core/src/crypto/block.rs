// ## 📂 File: `src/crypto/block.rs`

//! AES key schedules and the block modes built on them.
//!
//! Design notes:
//! - `AesSchedule` is the expanded key. The RustCrypto cipher objects carry
//!   both the encrypt and decrypt round keys and wipe them on drop.
//! - Modes operate in place on byte slices. Callers own bounds checking.
//! - CMAC/XCBC subkeys are derived once at session compile time.

use std::fmt;

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use zeroize::Zeroize;

use crate::constants::AES_BLOCK_SIZE;
use crate::crypto::types::{Block16, CryptoError};

/// Expanded AES key (128/192/256).
#[derive(Clone)]
pub enum AesSchedule {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl fmt::Debug for AesSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AesSchedule({} bytes)", self.key_len())
    }
}

impl AesSchedule {
    pub fn expand(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLen { actual: key.len() };
        match key.len() {
            16 => Aes128::new_from_slice(key).map(AesSchedule::Aes128).map_err(invalid),
            24 => Aes192::new_from_slice(key).map(AesSchedule::Aes192).map_err(invalid),
            32 => Aes256::new_from_slice(key).map(AesSchedule::Aes256).map_err(invalid),
            actual => Err(CryptoError::InvalidKeyLen { actual }),
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            AesSchedule::Aes128(_) => 16,
            AesSchedule::Aes192(_) => 24,
            AesSchedule::Aes256(_) => 32,
        }
    }

    #[inline]
    pub fn encrypt_block(&self, block: &mut Block16) {
        let b = Block::from_mut_slice(block);
        match self {
            AesSchedule::Aes128(c) => c.encrypt_block(b),
            AesSchedule::Aes192(c) => c.encrypt_block(b),
            AesSchedule::Aes256(c) => c.encrypt_block(b),
        }
    }

    #[inline]
    pub fn decrypt_block(&self, block: &mut Block16) {
        let b = Block::from_mut_slice(block);
        match self {
            AesSchedule::Aes128(c) => c.decrypt_block(b),
            AesSchedule::Aes192(c) => c.decrypt_block(b),
            AesSchedule::Aes256(c) => c.decrypt_block(b),
        }
    }
}

fn block_from(bytes: &[u8]) -> Result<Block16, CryptoError> {
    if bytes.len() != AES_BLOCK_SIZE {
        return Err(CryptoError::InvalidNonceLen { actual: bytes.len() });
    }
    let mut b = [0u8; AES_BLOCK_SIZE];
    b.copy_from_slice(bytes);
    Ok(b)
}

#[inline]
fn xor_in(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}

fn require_aligned(data: &[u8]) -> Result<(), CryptoError> {
    if data.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::PartialBlock { len: data.len() });
    }
    Ok(())
}

fn increment_be(block: &mut Block16) {
    for b in block.iter_mut().rev() {
        let (v, carry) = b.overflowing_add(1);
        *b = v;
        if !carry {
            break;
        }
    }
}

pub fn cbc_encrypt(ks: &AesSchedule, iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    require_aligned(data)?;
    let mut chain = block_from(iv)?;
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        xor_in(&mut chain, chunk);
        ks.encrypt_block(&mut chain);
        chunk.copy_from_slice(&chain);
    }
    Ok(())
}

pub fn cbc_decrypt(ks: &AesSchedule, iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    require_aligned(data)?;
    let mut prev = block_from(iv)?;
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        let mut cur = [0u8; AES_BLOCK_SIZE];
        cur.copy_from_slice(chunk);
        let mut plain = cur;
        ks.decrypt_block(&mut plain);
        xor_in(&mut plain, &prev);
        chunk.copy_from_slice(&plain);
        prev = cur;
    }
    Ok(())
}

pub fn ecb_encrypt(ks: &AesSchedule, data: &mut [u8]) -> Result<(), CryptoError> {
    require_aligned(data)?;
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        let mut b = [0u8; AES_BLOCK_SIZE];
        b.copy_from_slice(chunk);
        ks.encrypt_block(&mut b);
        chunk.copy_from_slice(&b);
    }
    Ok(())
}

pub fn ecb_decrypt(ks: &AesSchedule, data: &mut [u8]) -> Result<(), CryptoError> {
    require_aligned(data)?;
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        let mut b = [0u8; AES_BLOCK_SIZE];
        b.copy_from_slice(chunk);
        ks.decrypt_block(&mut b);
        chunk.copy_from_slice(&b);
    }
    Ok(())
}

/// AES-CTR. A 16-byte IV is the initial counter block; a 12-byte IV is a
/// nonce followed by a 32-bit block counter starting at 1.
pub fn ctr_apply(ks: &AesSchedule, iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    let mut counter = match iv.len() {
        16 => block_from(iv)?,
        12 => {
            let mut b = [0u8; AES_BLOCK_SIZE];
            b[..12].copy_from_slice(iv);
            b[15] = 1;
            b
        }
        actual => return Err(CryptoError::InvalidNonceLen { actual }),
    };
    for chunk in data.chunks_mut(AES_BLOCK_SIZE) {
        let mut stream = counter;
        ks.encrypt_block(&mut stream);
        xor_in(chunk, &stream);
        increment_be(&mut counter);
    }
    Ok(())
}

/// DOCSIS BPI encrypt: CBC over whole blocks, CFB over the trailing partial block.
pub fn docsis_bpi_encrypt(ks: &AesSchedule, iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    let full = data.len() / AES_BLOCK_SIZE * AES_BLOCK_SIZE;
    let (head, tail) = data.split_at_mut(full);
    cbc_encrypt(ks, iv, head)?;
    if !tail.is_empty() {
        let mut stream = if full == 0 { block_from(iv)? } else { block_from(&head[full - AES_BLOCK_SIZE..])? };
        ks.encrypt_block(&mut stream);
        xor_in(tail, &stream);
    }
    Ok(())
}

pub fn docsis_bpi_decrypt(ks: &AesSchedule, iv: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    let full = data.len() / AES_BLOCK_SIZE * AES_BLOCK_SIZE;
    let (head, tail) = data.split_at_mut(full);
    // Residual keystream comes from the last ciphertext block, before it is decrypted.
    if !tail.is_empty() {
        let mut stream = if full == 0 { block_from(iv)? } else { block_from(&head[full - AES_BLOCK_SIZE..])? };
        ks.encrypt_block(&mut stream);
        xor_in(tail, &stream);
    }
    cbc_decrypt(ks, iv, head)
}

/// GF(2^128) doubling used for CMAC subkeys.
fn dbl(block: &Block16) -> Block16 {
    let mut out = [0u8; AES_BLOCK_SIZE];
    let msb = block[0] & 0x80;
    for i in 0..AES_BLOCK_SIZE {
        let next = if i + 1 < AES_BLOCK_SIZE { block[i + 1] >> 7 } else { 0 };
        out[i] = (block[i] << 1) | next;
    }
    if msb != 0 {
        out[AES_BLOCK_SIZE - 1] ^= 0x87;
    }
    out
}

/// CMAC subkeys K1, K2 (RFC 4493).
pub fn cmac_subkeys(ks: &AesSchedule) -> (Block16, Block16) {
    let mut l = [0u8; AES_BLOCK_SIZE];
    ks.encrypt_block(&mut l);
    let k1 = dbl(&l);
    let k2 = dbl(&k1);
    l.zeroize();
    (k1, k2)
}

/// CBC-MAC whose last block is masked with `complete_key` when whole,
/// or padded with 10* and masked with `padded_key` otherwise.
fn masked_cbc_mac(ks: &AesSchedule, complete_key: &Block16, padded_key: &Block16, msg: &[u8]) -> Block16 {
    let n = if msg.is_empty() { 1 } else { msg.len().div_ceil(AES_BLOCK_SIZE) };
    let complete = !msg.is_empty() && msg.len() % AES_BLOCK_SIZE == 0;

    let mut x = [0u8; AES_BLOCK_SIZE];
    for chunk in msg.chunks(AES_BLOCK_SIZE).take(n - 1) {
        xor_in(&mut x, chunk);
        ks.encrypt_block(&mut x);
    }

    let tail = &msg[(n - 1) * AES_BLOCK_SIZE..];
    let mut last = [0u8; AES_BLOCK_SIZE];
    last[..tail.len()].copy_from_slice(tail);
    if complete {
        xor_in(&mut last, complete_key);
    } else {
        last[tail.len()] = 0x80;
        xor_in(&mut last, padded_key);
    }
    xor_in(&mut x, &last);
    ks.encrypt_block(&mut x);
    x
}

pub fn cmac(ks: &AesSchedule, k1: &Block16, k2: &Block16, msg: &[u8]) -> Block16 {
    masked_cbc_mac(ks, k1, k2, msg)
}

/// AES-XCBC key derivation (RFC 3566): K1 expanded, K2, K3.
pub fn xcbc_keys(key: &[u8]) -> Result<(AesSchedule, Block16, Block16), CryptoError> {
    if key.len() != 16 {
        return Err(CryptoError::InvalidKeyLen { actual: key.len() });
    }
    let ks = AesSchedule::expand(key)?;
    let mut k1 = [0x01u8; AES_BLOCK_SIZE];
    let mut k2 = [0x02u8; AES_BLOCK_SIZE];
    let mut k3 = [0x03u8; AES_BLOCK_SIZE];
    ks.encrypt_block(&mut k1);
    ks.encrypt_block(&mut k2);
    ks.encrypt_block(&mut k3);
    let k1_expanded = AesSchedule::expand(&k1)?;
    k1.zeroize();
    Ok((k1_expanded, k2, k3))
}

pub fn xcbc_mac(k1: &AesSchedule, k2: &Block16, k3: &Block16, msg: &[u8]) -> Block16 {
    masked_cbc_mac(k1, k2, k3, msg)
}

/// CCM counter block: flags (L-1) || nonce || counter.
fn ccm_counter(nonce: &[u8], counter: u32) -> Block16 {
    let l = 15 - nonce.len();
    let mut b = [0u8; AES_BLOCK_SIZE];
    b[0] = (l - 1) as u8;
    b[1..1 + nonce.len()].copy_from_slice(nonce);
    let ctr = counter.to_be_bytes();
    let take = l.min(4);
    b[AES_BLOCK_SIZE - take..].copy_from_slice(&ctr[4 - take..]);
    b
}

fn check_ccm(nonce: &[u8], tag_len: usize) -> Result<(), CryptoError> {
    if !(7..=13).contains(&nonce.len()) {
        return Err(CryptoError::InvalidNonceLen { actual: nonce.len() });
    }
    if !(4..=16).contains(&tag_len) || tag_len % 2 == 1 {
        return Err(CryptoError::InvalidTagLen { requested: tag_len });
    }
    Ok(())
}

/// CCM tag over plaintext `payload` (RFC 3610).
pub fn ccm_tag(
    ks: &AesSchedule,
    nonce: &[u8],
    aad: &[u8],
    payload: &[u8],
    tag_len: usize,
) -> Result<Vec<u8>, CryptoError> {
    check_ccm(nonce, tag_len)?;
    let l = 15 - nonce.len();

    let mut b0 = [0u8; AES_BLOCK_SIZE];
    b0[0] = (if aad.is_empty() { 0 } else { 0x40 }) | ((((tag_len - 2) / 2) as u8) << 3) | (l - 1) as u8;
    b0[1..1 + nonce.len()].copy_from_slice(nonce);
    let len_bytes = (payload.len() as u64).to_be_bytes();
    b0[AES_BLOCK_SIZE - l..].copy_from_slice(&len_bytes[8 - l..]);

    let mut x = b0;
    ks.encrypt_block(&mut x);

    let absorb = |data: &[u8], x: &mut Block16| {
        for chunk in data.chunks(AES_BLOCK_SIZE) {
            xor_in(x, chunk);
            ks.encrypt_block(x);
        }
    };

    if !aad.is_empty() {
        let mut encoded = Vec::with_capacity(aad.len() + 6);
        if aad.len() < 0xFF00 {
            encoded.extend_from_slice(&(aad.len() as u16).to_be_bytes());
        } else {
            encoded.extend_from_slice(&[0xFF, 0xFE]);
            encoded.extend_from_slice(&(aad.len() as u32).to_be_bytes());
        }
        encoded.extend_from_slice(aad);
        absorb(&encoded, &mut x);
    }
    absorb(payload, &mut x);

    let mut s0 = ccm_counter(nonce, 0);
    ks.encrypt_block(&mut s0);
    xor_in(&mut x, &s0);
    Ok(x[..tag_len].to_vec())
}

/// CCM payload encryption/decryption (counter starts at 1).
pub fn ccm_ctr(ks: &AesSchedule, nonce: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    if !(7..=13).contains(&nonce.len()) {
        return Err(CryptoError::InvalidNonceLen { actual: nonce.len() });
    }
    for (i, chunk) in data.chunks_mut(AES_BLOCK_SIZE).enumerate() {
        let mut stream = ccm_counter(nonce, i as u32 + 1);
        ks.encrypt_block(&mut stream);
        xor_in(chunk, &stream);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4493 example 1 key.
    const CMAC_KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
    ];

    #[test]
    fn cmac_empty_message_matches_rfc4493() {
        let ks = AesSchedule::expand(&CMAC_KEY).unwrap();
        let (k1, k2) = cmac_subkeys(&ks);
        assert_eq!(
            k1,
            [0xfb, 0xee, 0xd6, 0x18, 0x35, 0x71, 0x33, 0x66, 0x7c, 0x85, 0xe0, 0x8f, 0x72, 0x36, 0xa8, 0xde]
        );
        let tag = cmac(&ks, &k1, &k2, &[]);
        assert_eq!(
            tag,
            [0xbb, 0x1d, 0x69, 0x29, 0xe9, 0x59, 0x37, 0x28, 0x7f, 0xa3, 0x7d, 0x12, 0x9b, 0x75, 0x67, 0x46]
        );
    }

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn cmac_matches_rfc4493_examples() {
        let msg = unhex(concat!(
            "6bc1bee22e409f96e93d7e117393172a",
            "ae2d8a571e03ac9c9eb76fac45af8e51",
            "30c81c46a35ce411e5fbc1191a0a52ef",
            "f69f2445df4f9b17ad2b417be66c3710",
        ));
        let ks = AesSchedule::expand(&CMAC_KEY).unwrap();
        let (k1, k2) = cmac_subkeys(&ks);
        for (len, tag) in [
            (16, "070a16b46b4d4144f79bdd9dd04a287c"),
            (40, "dfa66747de9ae63030ca32611497c827"),
            (64, "51f0bebf7e3b9d92fc49741779363cfe"),
        ] {
            assert_eq!(cmac(&ks, &k1, &k2, &msg[..len]).to_vec(), unhex(tag), "len {}", len);
        }
    }

    #[test]
    fn xcbc_matches_rfc3566_vectors() {
        let key: Vec<u8> = (0..16u8).collect();
        let (k1, k2, k3) = xcbc_keys(&key).unwrap();
        let msg: Vec<u8> = (0..32u8).collect();
        for (len, mac) in [
            (0, "75f0251d528ac01c4573dfd584d79f29"),
            (3, "5b376580ae2f19afe7219ceef172756f"),
            (16, "d2a246fa349b68a79998a4394ff7a263"),
            (32, "f54f0ec8d2b9f3d36807734bd5283fd4"),
        ] {
            assert_eq!(xcbc_mac(&k1, &k2, &k3, &msg[..len]).to_vec(), unhex(mac), "len {}", len);
        }
    }

    #[test]
    fn xcbc_rejects_long_key() {
        assert!(xcbc_keys(&[0u8; 32]).is_err());
    }

    // RFC 3610 packet vector #1.
    #[test]
    fn ccm_matches_rfc3610_packet_one() {
        let key: Vec<u8> = (0xc0..=0xcfu8).collect();
        let ks = AesSchedule::expand(&key).unwrap();
        let nonce = unhex("00000003020100a0a1a2a3a4a5");
        let header: Vec<u8> = (0..8u8).collect();
        let plain: Vec<u8> = (8..0x1fu8).collect();

        let tag = ccm_tag(&ks, &nonce, &header, &plain, 8).unwrap();
        assert_eq!(tag, unhex("17e8d12cfdf926e0"));

        let mut buf = plain.clone();
        ccm_ctr(&ks, &nonce, &mut buf).unwrap();
        assert_eq!(buf, unhex("588c979a61c663d2f066d0c2c0f989806d5f6b61dac384"));
        ccm_ctr(&ks, &nonce, &mut buf).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn ccm_rejects_odd_tag_and_short_nonce() {
        let ks = AesSchedule::expand(&[0u8; 16]).unwrap();
        assert_eq!(ccm_tag(&ks, &[0u8; 13], &[], &[], 7), Err(CryptoError::InvalidTagLen { requested: 7 }));
        assert_eq!(ccm_tag(&ks, &[0u8; 6], &[], &[], 8), Err(CryptoError::InvalidNonceLen { actual: 6 }));
    }

    #[test]
    fn cbc_round_trip() {
        let ks = AesSchedule::expand(&[7u8; 32]).unwrap();
        let iv = [9u8; 16];
        let plain: Vec<u8> = (0..64u8).collect();
        let mut buf = plain.clone();
        cbc_encrypt(&ks, &iv, &mut buf).unwrap();
        assert_ne!(buf, plain);
        cbc_decrypt(&ks, &iv, &mut buf).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn cbc_rejects_partial_block() {
        let ks = AesSchedule::expand(&[7u8; 16]).unwrap();
        let mut buf = vec![0u8; 20];
        assert_eq!(cbc_encrypt(&ks, &[0u8; 16], &mut buf), Err(CryptoError::PartialBlock { len: 20 }));
    }

    #[test]
    fn docsis_residual_round_trip() {
        let ks = AesSchedule::expand(&[1u8; 16]).unwrap();
        let iv = [2u8; 16];
        for len in [5usize, 16, 23, 48, 50] {
            let plain: Vec<u8> = (0..len as u8).collect();
            let mut buf = plain.clone();
            docsis_bpi_encrypt(&ks, &iv, &mut buf).unwrap();
            docsis_bpi_decrypt(&ks, &iv, &mut buf).unwrap();
            assert_eq!(buf, plain, "len {}", len);
        }
    }

    #[test]
    fn ctr_is_an_involution() {
        let ks = AesSchedule::expand(&[3u8; 24]).unwrap();
        let plain = vec![0x55u8; 37];
        let mut buf = plain.clone();
        ctr_apply(&ks, &[4u8; 12], &mut buf).unwrap();
        ctr_apply(&ks, &[4u8; 12], &mut buf).unwrap();
        assert_eq!(buf, plain);
    }
}
