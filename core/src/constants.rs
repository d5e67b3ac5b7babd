// ## 📂 File: `src/constants.rs`

//! Engine-wide limits and algorithm size tables.

/// Maximum number of jobs submitted to the accelerator in one burst.
pub const MAX_BURST_SIZE: usize = 128;

/// Job slots owned by one accelerator manager. Also the digest scratch ring size.
pub const MAX_JOBS: usize = 256;

/// Maximum segments described inside a single native SGL job.
pub const MAX_NUM_SEGS: usize = 16;

/// Largest digest any supported algorithm emits (SHA-512).
pub const DIGEST_LENGTH_MAX: usize = 64;

/// Largest HMAC block size (SHA-384/512).
pub const HMAC_MAX_BLOCK_SIZE: usize = 128;

pub const AES_BLOCK_SIZE: usize = 16;
pub const DES_BLOCK_SIZE: usize = 8;

/// Ethernet FCS length, used as the DOCSIS CRC digest length.
pub const ETHER_CRC_LEN: usize = 4;

/// CCM AAD buffers reserve 18 bytes (B0 + encoded length) ahead of the AAD.
pub const CCM_AAD_OFFSET: usize = 18;

/// CCM nonces are stored after the one-byte flags field.
pub const CCM_IV_OFFSET: usize = 1;

pub const AES_CCM_DIGEST_MIN_LEN: usize = 4;
pub const AES_CCM_DIGEST_MAX_LEN: usize = 16;

/// Standard 12-byte nonce length for GCM and ChaCha20-Poly1305.
pub const NONCE_LEN_12: usize = 12;

/// Defaults for `DriverConfig`.
pub const DEFAULT_ACCEL_LANES: usize = 4;
pub const DEFAULT_INGRESS_CAPACITY: usize = 4096;
pub const DEFAULT_SESSION_POOL_SIZE: usize = 64;
pub const DEFAULT_FLUSH_RETRY_LIMIT: u32 = 8;
pub const DEFAULT_TEMPLATE_CACHE_SIZE: usize = 1024;

/// Key sizes accepted by the session compiler.
pub mod key_sizes {
    pub const KEY_64: usize = 8;
    pub const KEY_128: usize = 16;
    pub const KEY_192: usize = 24;
    pub const KEY_256: usize = 32;
}

/// Digest sizes in bytes: `(truncated, full)`.
pub mod digest_sizes {
    pub const MD5: (usize, usize) = (12, 16);
    pub const SHA1: (usize, usize) = (12, 20);
    pub const SHA224: (usize, usize) = (14, 28);
    pub const SHA256: (usize, usize) = (16, 32);
    pub const SHA384: (usize, usize) = (24, 48);
    pub const SHA512: (usize, usize) = (32, 64);
    pub const SM3: (usize, usize) = (32, 32);
    pub const AES_XCBC: (usize, usize) = (12, 16);
    pub const AES_CMAC: (usize, usize) = (4, 16);
    pub const AES_GMAC: (usize, usize) = (16, 16);
    pub const WIRELESS: (usize, usize) = (4, 4);
    pub const ZUC256: (usize, usize) = (4, 16);
}

/// Hash block sizes in bytes (HMAC pad width).
pub mod block_sizes {
    pub const MD5: usize = 64;
    pub const SHA1: usize = 64;
    pub const SHA224: usize = 64;
    pub const SHA256: usize = 64;
    pub const SHA384: usize = 128;
    pub const SHA512: usize = 128;
    pub const SM3: usize = 64;
}
