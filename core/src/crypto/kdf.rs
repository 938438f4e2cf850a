// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! HKDF-SHA-256 key schedule for both Web Push content codings.
//!
//! Design:
//! - HKDF(auth_secret, ecdh_secret, key_info) -> IKM (32 bytes)
//! - HKDF(salt, IKM, cek_info) -> CEK (16 bytes)
//! - HKDF(salt, IKM, nonce_info) -> NONCE (12 bytes)
//!
//! Only the info strings differ between `aes128gcm` (RFC 8291) and the legacy
//! `aesgcm` draft, which additionally binds a "P-256" context block.

use byteorder::{BigEndian, WriteBytesExt};
use hkdf::Hkdf;
use sha2::Sha256;

use crate::constants::{info, MAX_AUTH_SECRET_LEN, MIN_AUTH_SECRET_LEN};
use crate::crypto::types::{ContentKeys, CryptoError, IKM_LEN, PUBLIC_KEY_LEN, SALT_LEN};
use crate::ece::ContentEncoding;

/// Reject auth secrets outside the accepted bounds.
#[inline]
pub fn validate_auth_secret(auth: &[u8]) -> Result<(), CryptoError> {
    if auth.len() < MIN_AUTH_SECRET_LEN || auth.len() > MAX_AUTH_SECRET_LEN {
        return Err(CryptoError::InvalidAuthSecret { len: auth.len() });
    }
    Ok(())
}

/// Inputs to the key schedule. Public keys are uncompressed SEC1 points:
/// `ua_public` belongs to the subscriber, `as_public` to the ephemeral sender.
pub struct KeySchedule<'a> {
    pub ecdh_secret: &'a [u8],
    pub auth_secret: &'a [u8],
    pub ua_public: &'a [u8; PUBLIC_KEY_LEN],
    pub as_public: &'a [u8; PUBLIC_KEY_LEN],
    pub salt: &'a [u8; SALT_LEN],
}

/// Derive the content-encryption key and nonce for the chosen coding.
pub fn derive_content_keys(
    encoding: ContentEncoding,
    ks: &KeySchedule<'_>,
) -> Result<ContentKeys, CryptoError> {
    validate_auth_secret(ks.auth_secret)?;

    match encoding {
        ContentEncoding::Aes128Gcm => {
            let ikm = hkdf_sha256(
                ks.auth_secret,
                ks.ecdh_secret,
                &[info::WEBPUSH_INFO, ks.ua_public, ks.as_public],
                IKM_LEN,
            )?;
            let mut keys = empty_keys();
            expand_into(ks.salt, &ikm, &[info::AES128GCM], &mut keys.cek)?;
            expand_into(ks.salt, &ikm, &[info::NONCE], &mut keys.nonce)?;
            Ok(keys)
        }

        ContentEncoding::AesGcm => {
            let ikm = hkdf_sha256(ks.auth_secret, ks.ecdh_secret, &[info::AUTH], IKM_LEN)?;
            let context = legacy_context(ks.ua_public, ks.as_public)?;
            let mut keys = empty_keys();
            expand_into(ks.salt, &ikm, &[info::AESGCM, &context], &mut keys.cek)?;
            expand_into(ks.salt, &ikm, &[info::NONCE, &context], &mut keys.nonce)?;
            Ok(keys)
        }
    }
}

/// "P-256" || 0x00 || len(ua) || ua || len(as) || as, lengths as u16 BE.
fn legacy_context(
    ua_public: &[u8; PUBLIC_KEY_LEN],
    as_public: &[u8; PUBLIC_KEY_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let mut ctx = Vec::with_capacity(info::P256_LABEL.len() + 2 * (2 + PUBLIC_KEY_LEN));
    ctx.extend_from_slice(info::P256_LABEL);
    for key in [ua_public, as_public] {
        ctx.write_u16::<BigEndian>(PUBLIC_KEY_LEN as u16)
            .map_err(|e| CryptoError::Failure(e.to_string()))?;
        ctx.extend_from_slice(key);
    }
    Ok(ctx)
}

fn empty_keys() -> ContentKeys {
    ContentKeys { cek: [0u8; 16], nonce: [0u8; 12] }
}

fn hkdf_sha256(
    salt: &[u8],
    ikm: &[u8],
    info: &[&[u8]],
    len: usize,
) -> Result<Vec<u8>, CryptoError> {
    let mut okm = vec![0u8; len];
    expand_into(salt, ikm, info, &mut okm)?;
    Ok(okm)
}

fn expand_into(salt: &[u8], ikm: &[u8], info: &[&[u8]], okm: &mut [u8]) -> Result<(), CryptoError> {
    Hkdf::<Sha256>::new(Some(salt), ikm)
        .expand_multi_info(info, okm)
        .map_err(|_| CryptoError::Failure(format!("HKDF expand failed ({} bytes)", okm.len())))
}
