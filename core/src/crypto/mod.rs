//! crypto/mod.rs
//! Key agreement and derivation primitives shared by both content codings.

pub mod types;
pub mod ecdh;
pub mod kdf;
pub mod aead;
pub mod nonce;

pub use types::*;
pub use ecdh::*;
pub use kdf::*;
pub use aead::*;
pub use nonce::*;
