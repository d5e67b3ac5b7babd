// ## 📂 File: `src/crypto/types.rs`

use thiserror::Error;

/// AES block, as handled by the mode helpers.
pub type Block16 = [u8; 16];

/// Full AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key length provided to a primitive.
    #[error("invalid key length: {actual}")]
    InvalidKeyLen { actual: usize },

    /// IV or nonce length the mode cannot use.
    #[error("invalid nonce length: {actual}")]
    InvalidNonceLen { actual: usize },

    /// Block mode given data that is not a whole number of blocks.
    #[error("data length {len} is not block aligned")]
    PartialBlock { len: usize },

    /// Tag length outside what the mode can produce.
    #[error("invalid tag length: {requested}")]
    InvalidTagLen { requested: usize },

    /// General primitive failure with context.
    #[error("crypto failure: {0}")]
    Failure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbuf::BufferError;
    use crate::types::DriverError;

    #[test]
    fn messages_name_the_failing_value() {
        assert_eq!(CryptoError::PartialBlock { len: 20 }.to_string(), "data length 20 is not block aligned");
        let e = BufferError::OutOfBounds { offset: 4, len: 8, size: 10 };
        assert_eq!(e.to_string(), "buffer access out of bounds: offset=4 len=8 size=10");
    }

    #[test]
    fn errors_convert_into_driver_error() {
        let e: DriverError = CryptoError::InvalidKeyLen { actual: 5 }.into();
        assert_eq!(e.to_string(), "crypto error: invalid key length: 5");
        let boxed: Box<dyn std::error::Error> = Box::new(BufferError::MissingSegment { offset: 3 });
        assert_eq!(boxed.to_string(), "segment chain too short for offset 3");
    }
}
