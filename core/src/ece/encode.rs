// ## 📂 File: `src/ece/encode.rs`

//! src/ece/encode.rs
//! Single-record content encoder for `aes128gcm` and `aesgcm`.
//!
//! Design notes:
//! - The size check runs before any key material is generated, so an
//!   oversized payload never consumes randomness or performs ECDH.
//! - A fresh ephemeral key pair and salt come from the caller's RNG per call;
//!   `encrypt_with` takes them explicitly for test vectors.
//! - Wire layout:
//!
//! ```text
//! aes128gcm: [ salt (16) ][ rs u32 BE ][ idlen (1) ][ as_public (65) ][ AEAD(payload || 0x02 || 0^pad) ]
//! aesgcm:    [ AEAD(pad u16 BE || 0^pad || payload) ]
//! ```

use byteorder::{BigEndian, WriteBytesExt};
use rand::{CryptoRng, RngCore};

use crate::constants::{delimiters, MAX_BODY_SIZE, MAX_PAD_LEN, RECORD_SIZE};
use crate::crypto::{
    agree, derive_content_keys, generate_salt, validate_salt, EphemeralKeyPair, KeySchedule,
    RecordCipher, PUBLIC_KEY_LEN, SALT_LEN,
};
use crate::ece::types::{ContentEncoding, EceError, EncryptedContent};
use crate::subscription::SubscriptionKeys;

/// Reject payload/padding combinations that cannot fit one record.
pub fn check_size(encoding: ContentEncoding, payload_len: usize, pad_len: usize) -> Result<(), EceError> {
    if pad_len > MAX_PAD_LEN {
        return Err(EceError::PaddingTooLarge { have: pad_len, max: MAX_PAD_LEN });
    }
    if encoding.body_len(payload_len, pad_len) > MAX_BODY_SIZE {
        return Err(EceError::PayloadTooLarge {
            have: payload_len,
            max: encoding.max_payload_len(pad_len),
        });
    }
    Ok(())
}

/// Encrypt `payload` for the subscriber with a fresh sender key and salt.
pub fn encrypt<R: RngCore + CryptoRng>(
    encoding: ContentEncoding,
    keys: &SubscriptionKeys,
    payload: &[u8],
    pad_len: usize,
    rng: &mut R,
) -> Result<EncryptedContent, EceError> {
    check_size(encoding, payload.len(), pad_len)?;

    let ephemeral = EphemeralKeyPair::generate(rng);
    let salt = generate_salt(rng)?;
    encrypt_with(encoding, keys, payload, pad_len, &ephemeral, salt)
}

/// Deterministic variant: the caller supplies the sender key pair and salt.
/// Reusing either across messages breaks confidentiality.
pub fn encrypt_with(
    encoding: ContentEncoding,
    keys: &SubscriptionKeys,
    payload: &[u8],
    pad_len: usize,
    ephemeral: &EphemeralKeyPair,
    salt: [u8; SALT_LEN],
) -> Result<EncryptedContent, EceError> {
    check_size(encoding, payload.len(), pad_len)?;
    validate_salt(&salt)?;

    let shared = agree(ephemeral.secret(), keys.public_key());
    let schedule = KeySchedule {
        ecdh_secret: shared.raw_secret_bytes().as_slice(),
        auth_secret: keys.auth(),
        ua_public: keys.p256dh(),
        as_public: ephemeral.public_bytes(),
        salt: &salt,
    };
    let content_keys = derive_content_keys(encoding, &schedule)?;
    let cipher = RecordCipher::new(&content_keys);

    let record = pad_record(encoding, payload, pad_len)?;
    let sealed = cipher.seal(&record)?;

    let body = match encoding {
        ContentEncoding::Aes128Gcm => frame_aes128gcm(&salt, ephemeral.public_bytes(), &sealed)?,
        ContentEncoding::AesGcm => sealed,
    };

    debug_assert_eq!(body.len(), encoding.body_len(payload.len(), pad_len));
    tracing::trace!(
        encoding = %encoding,
        plaintext_len = payload.len(),
        pad_len,
        body_len = body.len(),
        "sealed push record"
    );

    Ok(EncryptedContent {
        encoding,
        body,
        salt,
        sender_public: *ephemeral.public_bytes(),
        plaintext_len: payload.len(),
        pad_len,
    })
}

/// Build the plaintext record with the coding's padding scheme applied.
fn pad_record(encoding: ContentEncoding, payload: &[u8], pad_len: usize) -> Result<Vec<u8>, EceError> {
    let mut record = Vec::with_capacity(payload.len() + encoding.padding_prefix_len() + pad_len);
    match encoding {
        ContentEncoding::Aes128Gcm => {
            record.extend_from_slice(payload);
            record.push(delimiters::LAST_RECORD);
            record.resize(record.len() + pad_len, 0);
        }
        ContentEncoding::AesGcm => {
            record.write_u16::<BigEndian>(pad_len as u16)?;
            record.resize(record.len() + pad_len, 0);
            record.extend_from_slice(payload);
        }
    }
    Ok(record)
}

fn frame_aes128gcm(
    salt: &[u8; SALT_LEN],
    sender_public: &[u8; PUBLIC_KEY_LEN],
    sealed: &[u8],
) -> Result<Vec<u8>, EceError> {
    let mut out = Vec::with_capacity(ContentEncoding::Aes128Gcm.header_len() + sealed.len());

    // --- Header block ---
    out.extend_from_slice(salt);
    out.write_u32::<BigEndian>(RECORD_SIZE)?;
    out.write_u8(PUBLIC_KEY_LEN as u8)?;
    out.extend_from_slice(sender_public);

    // --- Record ---
    out.extend_from_slice(sealed);
    Ok(out)
}
