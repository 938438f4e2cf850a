// ## 📂 File: `src/crypto/types.rs`

use std::fmt;

use crate::utils::fmt_bytes;

/// AES-128-GCM content-encryption key length.
pub const KEY_LEN_16: usize = 16;

/// Standard 12-byte nonce length for AES-GCM.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

/// Per-message salt length (bytes).
pub const SALT_LEN: usize = 16;

/// Uncompressed SEC1 P-256 point: 0x04 || X || Y.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Raw P-256 private scalar length.
pub const SECRET_KEY_LEN: usize = 32;

/// HKDF output length of the intermediate key material.
pub const IKM_LEN: usize = 32;

/// Content-encryption key and base nonce for a single record.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKeys {
    pub cek: [u8; KEY_LEN_16],
    pub nonce: [u8; NONCE_LEN_12],
}

impl fmt::Debug for ContentKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentKeys").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum CryptoError {
    /// Subscriber public key has the wrong length, prefix or is off-curve.
    InvalidPublicKey(String),

    /// Local private key (ephemeral or receiving side) is not a valid scalar.
    InvalidPrivateKey(String),

    /// Auth secret length outside the accepted bounds.
    InvalidAuthSecret { len: usize },

    /// Salt is invalid (all zeros).
    InvalidSalt { salt: [u8; SALT_LEN] },

    /// AEAD tag mismatch (authentication failure).
    TagMismatch,

    /// General derivation or runtime error with context.
    Failure(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            InvalidPublicKey(msg) =>
                write!(f, "invalid public key: {}", msg),
            InvalidPrivateKey(msg) =>
                write!(f, "invalid private key: {}", msg),
            InvalidAuthSecret { len } =>
                write!(f, "invalid auth secret length: {}", len),
            InvalidSalt { salt } =>
                write!(f, "invalid salt: all zeros ({})", fmt_bytes(salt)),
            TagMismatch =>
                write!(f, "AEAD tag mismatch"),
            Failure(msg) =>
                write!(f, "crypto failure: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}
