pub mod types;
pub mod aead;
pub mod block;
pub mod digest;

pub use types::*;
pub use aead::*;
pub use block::*;
pub use digest::*;
