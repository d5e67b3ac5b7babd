// ## 📂 File: `src/utils.rs`

//! utils.rs
//! Small helpers shared across modules.

use std::fmt;

use num_enum::TryFromPrimitive;

/// IEEE CRC32 as used by DOCSIS and Ethernet.
pub fn compute_crc32(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Bit count to whole bytes, truncating any partial byte.
#[inline]
pub fn bits_to_bytes(bits: u32) -> u64 {
    (bits >> 3) as u64
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}
