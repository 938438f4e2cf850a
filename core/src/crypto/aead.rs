// ## 📂 File: `src/crypto/aead.rs`

//! src/crypto/aead.rs
//! AES-128-GCM record sealing for HTTP-ECE.
//!
//! Design notes:
//! - Both content codings use a 16-byte CEK and a 12-byte nonce.
//! - Single-record bodies use the derived nonce as-is (record sequence 0).
//! - No AAD: HTTP-ECE binds context through the key schedule instead.
//! - Tag verification is constant-time and fails closed (no partial plaintext).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};

use crate::crypto::types::{ContentKeys, CryptoError, TAG_LEN};

#[derive(Clone)]
pub struct RecordCipher {
    cipher: Aes128Gcm,
    nonce: [u8; 12],
}

impl RecordCipher {
    pub fn new(keys: &ContentKeys) -> Self {
        let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&keys.cek));
        Self { cipher, nonce: keys.nonce }
    }

    /// Seal one padded record; output is ciphertext || 16-byte tag.
    pub fn seal(&self, record: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.cipher
            .encrypt(Nonce::from_slice(&self.nonce), record)
            .map_err(|_| CryptoError::Failure("AES-128-GCM seal failed".into()))
    }

    /// Open one record; fails with `TagMismatch` on any tampering.
    pub fn open(&self, ciphertext_and_tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(CryptoError::TagMismatch);
        }
        self.cipher
            .decrypt(Nonce::from_slice(&self.nonce), ciphertext_and_tag)
            .map_err(|_| CryptoError::TagMismatch)
    }
}
