// ## 📂 File: `src/session/xform.rs`

//! session/xform.rs
//! Transform-chain descriptors handed to the session compiler.
//!
//! Design notes:
//! - A chain is a plain slice of `Xform`; order in the slice is chain order.
//! - Algorithm registries are `#[repr(u16)]` so raw ids from a control plane
//!   can be checked with `TryFromPrimitive`.
//! - Key bytes live in `KeyBytes`, which is wiped on drop and never printed.

use std::fmt;

use num_enum::TryFromPrimitive;
use zeroize::Zeroizing;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CipherAlgo {
    Null = 0x0001,
    AesCbc = 0x0002,
    AesCtr = 0x0003,
    AesEcb = 0x0004,
    AesDocsisBpi = 0x0005,
    DesCbc = 0x0006,
    DesDocsisBpi = 0x0007,
    TripleDesCbc = 0x0008,
    ZucEea3 = 0x0009,
    Snow3gUea2 = 0x000A,
    KasumiF8 = 0x000B,
    Sm4Cbc = 0x000C,
    Sm4Ecb = 0x000D,
    Sm4Ctr = 0x000E,
    AesXts = 0x000F,
    AesF8 = 0x0010,
    TripleDesEcb = 0x0011,
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AuthAlgo {
    Null = 0x0101,
    AesXcbcMac = 0x0102,
    AesCmac = 0x0103,
    AesGmac = 0x0104,
    ZucEia3 = 0x0105,
    Snow3gUia2 = 0x0106,
    KasumiF9 = 0x0107,
    Md5Hmac = 0x0108,
    Sha1Hmac = 0x0109,
    Sha1 = 0x010A,
    Sha224Hmac = 0x010B,
    Sha224 = 0x010C,
    Sha256Hmac = 0x010D,
    Sha256 = 0x010E,
    Sha384Hmac = 0x010F,
    Sha384 = 0x0110,
    Sha512Hmac = 0x0111,
    Sha512 = 0x0112,
    Sm3 = 0x0113,
    Sm3Hmac = 0x0114,
    Md5 = 0x0115,
    AesCbcMac = 0x0116,
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AeadAlgo {
    AesCcm = 0x0201,
    AesGcm = 0x0202,
    Chacha20Poly1305 = 0x0203,
    Sm4Gcm = 0x0204,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CipherOp {
    Encrypt,
    Decrypt,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AuthOp {
    Generate,
    Verify,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AeadOp {
    Encrypt,
    Decrypt,
}

/// Location of an IV inside the operation's private area.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IvParam {
    pub offset: u16,
    pub length: u16,
}

impl IvParam {
    pub const fn new(offset: u16, length: u16) -> Self {
        Self { offset, length }
    }
}

/// Raw key material. Wiped on drop; `Debug` shows only the length.
#[derive(Clone, Default)]
pub struct KeyBytes(Zeroizing<Vec<u8>>);

impl KeyBytes {
    pub fn new(bytes: &[u8]) -> Self {
        Self(Zeroizing::new(bytes.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBytes(<{} bytes>)", self.len())
    }
}

impl From<&[u8]> for KeyBytes {
    fn from(b: &[u8]) -> Self {
        KeyBytes::new(b)
    }
}

#[derive(Clone, Debug)]
pub struct CipherXform {
    pub algo: CipherAlgo,
    pub op: CipherOp,
    pub key: KeyBytes,
    pub iv: IvParam,
}

#[derive(Clone, Debug)]
pub struct AuthXform {
    pub algo: AuthAlgo,
    pub op: AuthOp,
    pub key: KeyBytes,
    /// Auth IV (GMAC, ZUC-EIA3, SNOW3G-UIA2).
    pub iv: IvParam,
    pub digest_length: u16,
}

#[derive(Clone, Debug)]
pub struct AeadXform {
    pub algo: AeadAlgo,
    pub op: AeadOp,
    pub key: KeyBytes,
    pub iv: IvParam,
    pub digest_length: u16,
    pub aad_length: u16,
}

/// One element of a transform chain.
#[derive(Clone, Debug)]
pub enum Xform {
    Cipher(CipherXform),
    Auth(AuthXform),
    Aead(AeadXform),
}

impl Xform {
    pub fn cipher(algo: CipherAlgo, op: CipherOp, key: &[u8], iv: IvParam) -> Self {
        Xform::Cipher(CipherXform { algo, op, key: KeyBytes::new(key), iv })
    }

    pub fn auth(algo: AuthAlgo, op: AuthOp, key: &[u8], digest_length: u16) -> Self {
        Xform::Auth(AuthXform { algo, op, key: KeyBytes::new(key), iv: IvParam::default(), digest_length })
    }

    /// Auth transform that carries its own IV (GMAC and the wireless MACs).
    pub fn auth_with_iv(algo: AuthAlgo, op: AuthOp, key: &[u8], iv: IvParam, digest_length: u16) -> Self {
        Xform::Auth(AuthXform { algo, op, key: KeyBytes::new(key), iv, digest_length })
    }

    pub fn aead(algo: AeadAlgo, op: AeadOp, key: &[u8], iv: IvParam, digest_length: u16, aad_length: u16) -> Self {
        Xform::Aead(AeadXform { algo, op, key: KeyBytes::new(key), iv, digest_length, aad_length })
    }

    pub fn kind(&self) -> XformKind {
        match self {
            Xform::Cipher(_) => XformKind::Cipher,
            Xform::Auth(_) => XformKind::Auth,
            Xform::Aead(_) => XformKind::Aead,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum XformKind {
    Cipher,
    Auth,
    Aead,
}

impl fmt::Display for XformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            XformKind::Cipher => "cipher",
            XformKind::Auth => "auth",
            XformKind::Aead => "aead",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocsisDirection {
    /// Cipher decrypt, then CRC verify.
    Uplink,
    /// CRC generate, then cipher encrypt.
    Downlink,
}

/// DOCSIS lookaside-protocol security session configuration.
#[derive(Clone, Debug)]
pub struct DocsisConf {
    pub direction: DocsisDirection,
    pub crypto: Vec<Xform>,
}
