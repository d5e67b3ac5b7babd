// ## 📂 File: `src/job/types.rs`

//! job/types.rs
//! Hardware job descriptor shared by the builder, the accelerator and post-processing.
//!
//! Design notes:
//! - A job starts as a copy of the session's `JobTemplate`; the builder then
//!   fills addresses and lengths for one operation.
//! - Lengths carry their unit (`Extent`), so a bit-granular SNOW3G length
//!   cannot be read as bytes by accident.
//! - The job owns its operation while in flight and hands it back on completion.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use num_enum::TryFromPrimitive;

use crate::constants::digest_sizes;
use crate::mbuf::{BufHandle, BufPtr};
use crate::op::CryptoOp;
use crate::session::template::JobTemplate;
use crate::session::types::SessionParams;

#[repr(u16)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CipherMode {
    #[default]
    Null = 0x0000,
    Cbc = 0x0001,
    Cntr = 0x0002,
    Ecb = 0x0003,
    DocsisSecBpi = 0x0004,
    Des = 0x0005,
    DocsisDes = 0x0006,
    Des3 = 0x0007,
    ZucEea3 = 0x0008,
    Snow3gUea2Bitlen = 0x0009,
    KasumiUea1Bitlen = 0x000A,
    Sm4Cbc = 0x000B,
    Sm4Ecb = 0x000C,
    Sm4Cntr = 0x000D,
    Ccm = 0x000E,
    Gcm = 0x000F,
    GcmSgl = 0x0010,
    Chacha20Poly1305 = 0x0011,
    Chacha20Poly1305Sgl = 0x0012,
    Sm4Gcm = 0x0013,
}

impl CipherMode {
    /// Modes the accelerator can run directly over a segment list.
    pub fn supports_native_sgl(self) -> bool {
        matches!(
            self,
            CipherMode::Gcm | CipherMode::GcmSgl | CipherMode::Chacha20Poly1305 | CipherMode::Chacha20Poly1305Sgl
        )
    }

    /// Cipher offset/length are client bit values converted to bytes.
    pub fn is_zuc(self) -> bool {
        self == CipherMode::ZucEea3
    }

    /// Cipher offset/length stay in bits.
    pub fn is_bit_granular(self) -> bool {
        matches!(self, CipherMode::Snow3gUea2Bitlen | CipherMode::KasumiUea1Bitlen)
    }

    /// Client cipher region is expressed in bits (ZUC, SNOW3G, KASUMI).
    pub fn has_bit_region(self) -> bool {
        self.is_zuc() || self.is_bit_granular()
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HashAlg {
    #[default]
    Null = 0x0100,
    AesXcbc = 0x0101,
    AesCmac = 0x0102,
    /// GCM tag (paired with the GCM cipher mode).
    AesGmac = 0x0103,
    AesGmac128 = 0x0104,
    AesGmac192 = 0x0105,
    AesGmac256 = 0x0106,
    GcmSgl = 0x0107,
    ZucEia3Bitlen = 0x0108,
    Zuc256Eia3Bitlen = 0x0109,
    Snow3gUia2Bitlen = 0x010A,
    KasumiUia1 = 0x010B,
    /// HMAC-MD5.
    Md5 = 0x010C,
    HmacSha1 = 0x010D,
    Sha1 = 0x010E,
    HmacSha224 = 0x010F,
    Sha224 = 0x0110,
    HmacSha256 = 0x0111,
    Sha256 = 0x0112,
    HmacSha384 = 0x0113,
    Sha384 = 0x0114,
    HmacSha512 = 0x0115,
    Sha512 = 0x0116,
    Sm3 = 0x0117,
    HmacSm3 = 0x0118,
    AesCcm = 0x0119,
    Chacha20Poly1305 = 0x011A,
    Chacha20Poly1305Sgl = 0x011B,
    Sm4Gcm = 0x011C,
    DocsisCrc32 = 0x011D,
}

impl HashAlg {
    /// `(truncated, full)` digest lengths, for algorithms that have them.
    pub fn digest_sizes(self) -> Option<(usize, usize)> {
        use HashAlg::*;
        let sizes = match self {
            Md5 => digest_sizes::MD5,
            HmacSha1 | Sha1 => digest_sizes::SHA1,
            HmacSha224 | Sha224 => digest_sizes::SHA224,
            HmacSha256 | Sha256 => digest_sizes::SHA256,
            HmacSha384 | Sha384 => digest_sizes::SHA384,
            HmacSha512 | Sha512 => digest_sizes::SHA512,
            Sm3 | HmacSm3 => digest_sizes::SM3,
            AesXcbc => digest_sizes::AES_XCBC,
            AesCmac => digest_sizes::AES_CMAC,
            AesGmac | AesGmac128 | AesGmac192 | AesGmac256 => digest_sizes::AES_GMAC,
            ZucEia3Bitlen | Snow3gUia2Bitlen | KasumiUia1 => digest_sizes::WIRELESS,
            Zuc256Eia3Bitlen => digest_sizes::ZUC256,
            _ => return None,
        };
        Some(sizes)
    }

    /// Hash length in bits, offset in bytes.
    pub fn has_bit_length(self) -> bool {
        matches!(self, HashAlg::ZucEia3Bitlen | HashAlg::Zuc256Eia3Bitlen | HashAlg::Snow3gUia2Bitlen)
    }

    /// Client auth region is expressed in bits (ZUC, SNOW3G, KASUMI).
    pub fn has_bit_region(self) -> bool {
        self.has_bit_length() || self == HashAlg::KasumiUia1
    }
}

/// True when the job's tag belongs to an AEAD (digest taken from the aead fields).
pub fn is_aead_algo(hash: HashAlg, cipher: CipherMode) -> bool {
    matches!(
        hash,
        HashAlg::Chacha20Poly1305 | HashAlg::Chacha20Poly1305Sgl | HashAlg::AesCcm | HashAlg::GcmSgl | HashAlg::Sm4Gcm
    ) || (hash == HashAlg::AesGmac && matches!(cipher, CipherMode::Gcm | CipherMode::GcmSgl))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChainOrder {
    #[default]
    CipherHash,
    HashCipher,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CipherDirection {
    #[default]
    Encrypt,
    Decrypt,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SglState {
    /// Whole message in one job (plain buffers or a segment list).
    #[default]
    All,
    Init,
    Update,
    Complete,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum JobStatus {
    #[default]
    Pending,
    Completed,
    InvalidArgs,
    InternalError,
}

/// Offset or length with its unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Extent {
    Bytes(u64),
    Bits(u64),
}

impl Default for Extent {
    fn default() -> Self {
        Extent::Bytes(0)
    }
}

impl Extent {
    /// Byte value, truncating partial bytes.
    pub fn in_bytes(self) -> u64 {
        match self {
            Extent::Bytes(n) => n,
            Extent::Bits(n) => n >> 3,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Extent::Bytes(n) | Extent::Bits(n) => n == 0,
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Bytes(n) => write!(f, "{}B", n),
            Extent::Bits(n) => write!(f, "{}b", n),
        }
    }
}

/// One `(in, out, len)` triple of a native segment list.
#[derive(Clone, Debug)]
pub struct SglIoSeg {
    pub input: BufPtr,
    pub output: BufPtr,
    pub len: usize,
}

/// Running state of a multi-job SGL stream (INIT, UPDATE..., COMPLETE).
#[derive(Debug, Default)]
pub struct SglStream {
    pub input: Vec<u8>,
    pub outputs: Vec<(BufPtr, usize)>,
}

/// Stream context shared by the sub-jobs of one multi-job SGL operation.
#[derive(Clone, Debug, Default)]
pub struct SglContext(Arc<Mutex<SglStream>>);

impl SglContext {
    pub fn lock(&self) -> MutexGuard<'_, SglStream> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Hardware job descriptor.
#[derive(Debug, Default)]
pub struct Job {
    /// Copy of the session template; SGL handling may switch the modes.
    pub tmpl: JobTemplate,

    pub src: Option<BufPtr>,
    pub dst: Option<BufPtr>,
    /// Hash input base when it differs from `src` (out-of-place cipher-then-hash).
    pub hash_src: Option<BufPtr>,

    pub cipher_start: Extent,
    pub msg_len_to_cipher: Extent,
    pub hash_start_offset: u64,
    pub msg_len_to_hash: Extent,

    pub iv: Option<BufPtr>,
    pub auth_iv: Option<BufPtr>,
    pub aad: Option<BufPtr>,
    pub auth_tag_output: Option<BufPtr>,

    pub sgl_state: SglState,
    pub sgl_io_segs: Vec<SglIoSeg>,
    pub sgl_ctx: Option<SglContext>,

    pub status: JobStatus,
    pub user_data: Option<Box<CryptoOp>>,
    /// Linearization scratch buffer.
    pub user_data2: Option<BufHandle>,
    /// Session parameters captured at build time.
    pub sess: SessionParams,
    /// Element index for the synchronous bulk path.
    pub sync_index: Option<usize>,
}

impl Job {
    pub fn from_template(tmpl: &JobTemplate) -> Self {
        Self { tmpl: tmpl.clone(), ..Default::default() }
    }

    /// Base pointer the hash reads from.
    pub fn hash_base(&self) -> Option<&BufPtr> {
        self.hash_src.as_ref().or(self.src.as_ref())
    }

    pub fn take_op(&mut self) -> Option<Box<CryptoOp>> {
        self.user_data.take()
    }

    /// Copy of the descriptor without its operation or linear buffer.
    pub fn clone_shape(&self) -> Job {
        Job {
            tmpl: self.tmpl.clone(),
            src: self.src.clone(),
            dst: self.dst.clone(),
            hash_src: self.hash_src.clone(),
            cipher_start: self.cipher_start,
            msg_len_to_cipher: self.msg_len_to_cipher,
            hash_start_offset: self.hash_start_offset,
            msg_len_to_hash: self.msg_len_to_hash,
            iv: self.iv.clone(),
            auth_iv: self.auth_iv.clone(),
            aad: self.aad.clone(),
            auth_tag_output: self.auth_tag_output.clone(),
            sgl_state: self.sgl_state,
            sgl_io_segs: self.sgl_io_segs.clone(),
            sgl_ctx: self.sgl_ctx.clone(),
            status: self.status,
            user_data: None,
            user_data2: None,
            sess: self.sess,
            sync_index: self.sync_index,
        }
    }
}
