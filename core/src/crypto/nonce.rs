// ## 📂 File: `src/crypto/nonce.rs`

//! Per-message salt generation.
//!
//! The salt feeds HKDF for both the CEK and the nonce, so a fresh random salt
//! per message is what keeps (key, nonce) pairs unique.

use rand::{CryptoRng, RngCore};

use crate::crypto::types::{CryptoError, SALT_LEN};

/// Draw a fresh 16-byte salt from a cryptographic RNG.
pub fn generate_salt<R: RngCore + CryptoRng>(rng: &mut R) -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rng.try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::Failure(format!("random source failed: {}", e)))?;
    validate_salt(&salt)?;
    Ok(salt)
}

/// An all-zero salt only comes out of a broken RNG or an uninitialized buffer.
#[inline]
pub fn validate_salt(salt: &[u8; SALT_LEN]) -> Result<(), CryptoError> {
    if salt.iter().all(|&b| b == 0) {
        return Err(CryptoError::InvalidSalt { salt: *salt });
    }
    Ok(())
}
