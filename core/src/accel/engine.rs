// ## 📂 File: `src/accel/engine.rs`

//! accel/engine.rs
//! Executes one job in software.
//!
//! Cipher input is `src + cipher_start`, output is written at `dst`. The hash
//! reads `hash_base() + hash_start_offset`; the tag goes to `auth_tag_output`,
//! truncated to the template tag length.

use tracing::trace;

use crate::accel::AccelError;
use crate::crypto::{
    cbc_decrypt, cbc_encrypt, ccm_ctr, ccm_tag, cmac, ctr_apply, docsis_bpi_decrypt, docsis_bpi_encrypt,
    ecb_decrypt, ecb_encrypt, hash, hmac_with_pads, xcbc_mac, AeadImpl, AesSchedule, HashFn, TAG_LEN,
};
use crate::job::types::{ChainOrder, CipherDirection, CipherMode, HashAlg, Job, SglState};
use crate::mbuf::BufPtr;
use crate::session::keys::{AuthKey, CipherKey};
use crate::utils::compute_crc32;

pub fn execute(job: &Job) -> Result<(), AccelError> {
    trace!(cipher = ?job.tmpl.cipher_mode, hash = ?job.tmpl.hash_alg, sgl = ?job.sgl_state, "execute job");
    match job.tmpl.cipher_mode {
        CipherMode::Gcm | CipherMode::Chacha20Poly1305 => run_aead(job),
        CipherMode::GcmSgl | CipherMode::Chacha20Poly1305Sgl => run_aead_sgl(job),
        CipherMode::Ccm => run_ccm(job),
        _ => match job.tmpl.chain_order {
            ChainOrder::CipherHash => {
                run_cipher(job)?;
                run_hash(job)
            }
            ChainOrder::HashCipher => {
                run_hash(job)?;
                run_cipher(job)
            }
        },
    }
}

/// Hash function behind a plain or HMAC hash algorithm.
pub fn hash_fn(alg: HashAlg) -> Option<HashFn> {
    use HashAlg::*;
    let f = match alg {
        Md5 => HashFn::Md5,
        HmacSha1 | Sha1 => HashFn::Sha1,
        HmacSha224 | Sha224 => HashFn::Sha224,
        HmacSha256 | Sha256 => HashFn::Sha256,
        HmacSha384 | Sha384 => HashFn::Sha384,
        HmacSha512 | Sha512 => HashFn::Sha512,
        Sm3 | HmacSm3 => HashFn::Sm3,
        _ => return None,
    };
    Some(f)
}

fn field<'a>(p: &'a Option<BufPtr>, name: &'static str) -> Result<&'a BufPtr, AccelError> {
    p.as_ref().ok_or(AccelError::MissingField(name))
}

fn encrypting(job: &Job) -> bool {
    job.tmpl.cipher_direction == CipherDirection::Encrypt
}

fn aes_key(job: &Job) -> Result<&AesSchedule, AccelError> {
    match &job.tmpl.keys.cipher {
        CipherKey::Aes(ks) => Ok(ks),
        other => Err(AccelError::KeyMismatch { expected: "aes", found: other.name() }),
    }
}

fn read_iv(job: &Job) -> Result<Vec<u8>, AccelError> {
    Ok(field(&job.iv, "iv")?.read(job.tmpl.iv_len as usize)?)
}

fn read_aad(job: &Job) -> Result<Vec<u8>, AccelError> {
    if job.tmpl.aad_len == 0 {
        return Ok(Vec::new());
    }
    Ok(field(&job.aad, "aad")?.read(job.tmpl.aad_len as usize)?)
}

fn write_tag(job: &Job, tag: &[u8]) -> Result<(), AccelError> {
    let out = field(&job.auth_tag_output, "tag output")?;
    let n = (job.tmpl.auth_tag_output_len as usize).min(tag.len());
    out.write(&tag[..n])?;
    Ok(())
}

fn cipher_input(job: &Job) -> Result<Vec<u8>, AccelError> {
    let src = field(&job.src, "source")?;
    let len = job.msg_len_to_cipher.in_bytes() as usize;
    Ok(src.add(job.cipher_start.in_bytes() as usize).read(len)?)
}

fn run_cipher(job: &Job) -> Result<(), AccelError> {
    let mode = job.tmpl.cipher_mode;
    if mode == CipherMode::Null || job.msg_len_to_cipher.is_zero() {
        return Ok(());
    }
    if !matches!(mode, CipherMode::Cbc | CipherMode::Cntr | CipherMode::Ecb | CipherMode::DocsisSecBpi) {
        return Err(AccelError::UnsupportedCipher(mode));
    }

    let ks = aes_key(job)?;
    let mut data = cipher_input(job)?;
    let enc = encrypting(job);
    match mode {
        CipherMode::Cbc if enc => cbc_encrypt(ks, &read_iv(job)?, &mut data)?,
        CipherMode::Cbc => cbc_decrypt(ks, &read_iv(job)?, &mut data)?,
        CipherMode::Cntr => ctr_apply(ks, &read_iv(job)?, &mut data)?,
        CipherMode::Ecb if enc => ecb_encrypt(ks, &mut data)?,
        CipherMode::Ecb => ecb_decrypt(ks, &mut data)?,
        CipherMode::DocsisSecBpi if enc => docsis_bpi_encrypt(ks, &read_iv(job)?, &mut data)?,
        CipherMode::DocsisSecBpi => docsis_bpi_decrypt(ks, &read_iv(job)?, &mut data)?,
        other => return Err(AccelError::UnsupportedCipher(other)),
    }
    field(&job.dst, "destination")?.write(&data)?;
    Ok(())
}

fn run_hash(job: &Job) -> Result<(), AccelError> {
    let alg = job.tmpl.hash_alg;
    if alg == HashAlg::Null {
        return Ok(());
    }
    let base = job.hash_base().ok_or(AccelError::MissingField("hash source"))?;
    let start = job.hash_start_offset as usize;
    let len = job.msg_len_to_hash.in_bytes() as usize;
    let msg = base.add(start).read(len)?;
    let auth = &job.tmpl.keys.auth;
    let mismatch = |expected: &'static str| AccelError::KeyMismatch { expected, found: auth.name() };

    let tag: Vec<u8> = match alg {
        HashAlg::DocsisCrc32 => {
            let crc = compute_crc32(&msg).to_le_bytes();
            // Downlink frames carry the CRC right after the hashed region.
            if encrypting(job) && len > 0 {
                base.add(start + len).write(&crc)?;
            }
            crc.to_vec()
        }
        HashAlg::AesXcbc => match auth {
            AuthKey::Xcbc { k1, k2, k3 } => xcbc_mac(k1, k2, k3, &msg).to_vec(),
            _ => return Err(mismatch("xcbc")),
        },
        HashAlg::AesCmac => match auth {
            AuthKey::Cmac { key, sk1, sk2 } => cmac(key, sk1, sk2, &msg).to_vec(),
            _ => return Err(mismatch("cmac")),
        },
        HashAlg::AesGmac128 | HashAlg::AesGmac192 | HashAlg::AesGmac256 => match auth {
            AuthKey::Gmac(g) => {
                let iv = field(&job.auth_iv, "auth iv")?.read(job.tmpl.gmac_iv_len as usize)?;
                g.aead.gmac(&iv, &msg)?.to_vec()
            }
            _ => return Err(mismatch("gmac")),
        },
        HashAlg::Md5
        | HashAlg::HmacSha1
        | HashAlg::HmacSha224
        | HashAlg::HmacSha256
        | HashAlg::HmacSha384
        | HashAlg::HmacSha512
        | HashAlg::HmacSm3 => match (auth, hash_fn(alg)) {
            (AuthKey::Hmac { inner, outer }, Some(f)) => hmac_with_pads(f, inner, outer, &msg),
            _ => return Err(mismatch("hmac")),
        },
        HashAlg::Sha1 | HashAlg::Sha224 | HashAlg::Sha256 | HashAlg::Sha384 | HashAlg::Sha512 | HashAlg::Sm3 => {
            match hash_fn(alg) {
                Some(f) => hash(f, &[&msg]),
                None => return Err(AccelError::UnsupportedHash(alg)),
            }
        }
        other => return Err(AccelError::UnsupportedHash(other)),
    };
    write_tag(job, &tag)
}

fn with_aead<R>(job: &Job, f: impl FnOnce(&AeadImpl) -> Result<R, AccelError>) -> Result<R, AccelError> {
    match &job.tmpl.keys.cipher {
        CipherKey::Gcm(g) => f(&g.aead),
        CipherKey::Chacha(k) => f(&AeadImpl::chacha(&k[..])?),
        other => Err(AccelError::KeyMismatch { expected: "gcm or chacha20", found: other.name() }),
    }
}

/// Encrypt or decrypt `data` in place; returns the tag over the ciphertext.
fn seal_or_open(job: &Job, data: &mut [u8]) -> Result<[u8; TAG_LEN], AccelError> {
    let iv = read_iv(job)?;
    let aad = read_aad(job)?;
    let enc = encrypting(job);
    with_aead(job, |imp| {
        let tag = if enc {
            imp.seal_detached(&iv, &aad, data)?
        } else {
            imp.open_detached(&iv, &aad, data)?
        };
        Ok(tag)
    })
}

fn run_aead(job: &Job) -> Result<(), AccelError> {
    let mut data = cipher_input(job)?;
    let tag = seal_or_open(job, &mut data)?;
    field(&job.dst, "destination")?.write(&data)?;
    write_tag(job, &tag)
}

fn scatter(data: &[u8], outputs: &[(BufPtr, usize)]) -> Result<(), AccelError> {
    let mut pos = 0;
    for (out, len) in outputs {
        out.write(&data[pos..pos + len])?;
        pos += len;
    }
    Ok(())
}

fn run_aead_sgl(job: &Job) -> Result<(), AccelError> {
    match job.sgl_state {
        SglState::All => {
            let mut data = Vec::new();
            for seg in &job.sgl_io_segs {
                data.extend_from_slice(&seg.input.read(seg.len)?);
            }
            let tag = seal_or_open(job, &mut data)?;
            let outputs: Vec<(BufPtr, usize)> = job.sgl_io_segs.iter().map(|s| (s.output.clone(), s.len)).collect();
            scatter(&data, &outputs)?;
            write_tag(job, &tag)
        }
        SglState::Init => {
            let ctx = job.sgl_ctx.as_ref().ok_or(AccelError::MissingField("sgl context"))?;
            let mut stream = ctx.lock();
            stream.input.clear();
            stream.outputs.clear();
            Ok(())
        }
        SglState::Update => {
            let ctx = job.sgl_ctx.as_ref().ok_or(AccelError::MissingField("sgl context"))?;
            let len = job.msg_len_to_cipher.in_bytes() as usize;
            let part = field(&job.src, "source")?.read(len)?;
            let out = field(&job.dst, "destination")?.clone();
            let mut stream = ctx.lock();
            stream.input.extend_from_slice(&part);
            stream.outputs.push((out, len));
            Ok(())
        }
        SglState::Complete => {
            let ctx = job.sgl_ctx.as_ref().ok_or(AccelError::MissingField("sgl context"))?;
            let (mut data, outputs) = {
                let mut stream = ctx.lock();
                (std::mem::take(&mut stream.input), std::mem::take(&mut stream.outputs))
            };
            let tag = seal_or_open(job, &mut data)?;
            scatter(&data, &outputs)?;
            write_tag(job, &tag)
        }
    }
}

fn run_ccm(job: &Job) -> Result<(), AccelError> {
    let ks = aes_key(job)?;
    let nonce = read_iv(job)?;
    let aad = read_aad(job)?;
    let tag_len = job.tmpl.auth_tag_output_len as usize;
    let mut data = cipher_input(job)?;

    let tag = if encrypting(job) {
        let tag = ccm_tag(ks, &nonce, &aad, &data, tag_len)?;
        ccm_ctr(ks, &nonce, &mut data)?;
        tag
    } else {
        ccm_ctr(ks, &nonce, &mut data)?;
        ccm_tag(ks, &nonce, &aad, &data, tag_len)?
    };
    field(&job.dst, "destination")?.write(&data)?;
    write_tag(job, &tag)
}
