// ## 📂 File: `src/ece/decode.rs`
//! src/ece/decode.rs
//!
//! Receive-side decoding, the user agent's half of the exchange.
//!
//! Design notes:
//! - Used to verify encoder output end to end.
//! - Only single-record bodies are accepted; push messages never span records.
//! - Any authentication or framing failure surfaces as an error, never as
//!   partial plaintext.

use byteorder::{BigEndian, ByteOrder};
use p256::SecretKey;

use crate::constants::delimiters;
use crate::crypto::{
    agree, derive_content_keys, encode_public_key, parse_public_key, KeySchedule, RecordCipher,
    PUBLIC_KEY_LEN, SALT_LEN, TAG_LEN,
};
use crate::ece::types::{ContentEncoding, EceError, EncryptedContent, MIN_RECORD_SIZE};
use crate::utils::b64url_decode;

/// Parsed `aes128gcm` header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBlock {
    pub salt: [u8; SALT_LEN],
    pub record_size: u32,
    pub key_id: Vec<u8>,
}

/// Split an `aes128gcm` body into its header block and the sealed record.
pub fn parse_header_block(body: &[u8]) -> Result<(HeaderBlock, &[u8]), EceError> {
    const FIXED: usize = SALT_LEN + 4 + 1;
    if body.len() < FIXED {
        return Err(EceError::Malformed(format!(
            "body of {} bytes is shorter than the {} byte header",
            body.len(),
            FIXED
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&body[..SALT_LEN]);
    let record_size = BigEndian::read_u32(&body[SALT_LEN..SALT_LEN + 4]);
    let id_len = body[SALT_LEN + 4] as usize;

    let header_len = FIXED + id_len;
    if body.len() < header_len {
        return Err(EceError::Malformed(format!("truncated key id: need {} bytes", id_len)));
    }
    if record_size < MIN_RECORD_SIZE {
        return Err(EceError::Malformed(format!("record size {} below minimum", record_size)));
    }

    let record = &body[header_len..];
    if record.len() <= TAG_LEN {
        return Err(EceError::Malformed("record shorter than the AEAD tag".into()));
    }
    if record.len() > record_size as usize {
        return Err(EceError::Malformed("multi-record bodies are not supported".into()));
    }

    let header = HeaderBlock { salt, record_size, key_id: body[FIXED..header_len].to_vec() };
    Ok((header, record))
}

/// Decrypt an `aes128gcm` body with the subscriber's private key and auth secret.
pub fn decrypt_aes128gcm(body: &[u8], ua_secret: &SecretKey, auth: &[u8]) -> Result<Vec<u8>, EceError> {
    let (header, record) = parse_header_block(body)?;
    if header.key_id.len() != PUBLIC_KEY_LEN {
        return Err(EceError::Malformed(format!(
            "key id must be a {} byte public key, got {} bytes",
            PUBLIC_KEY_LEN,
            header.key_id.len()
        )));
    }

    let plaintext = open_record(
        ContentEncoding::Aes128Gcm,
        record,
        ua_secret,
        auth,
        &header.salt,
        &header.key_id,
    )?;
    unpad_aes128gcm(plaintext)
}

/// Decrypt an `aesgcm` body; salt and sender key arrive out of band
/// (see [`parse_crypto_headers`]).
pub fn decrypt_aesgcm(
    ciphertext: &[u8],
    ua_secret: &SecretKey,
    auth: &[u8],
    salt: &[u8; SALT_LEN],
    as_public: &[u8],
) -> Result<Vec<u8>, EceError> {
    if ciphertext.len() <= TAG_LEN {
        return Err(EceError::Malformed("record shorter than the AEAD tag".into()));
    }
    let plaintext = open_record(ContentEncoding::AesGcm, ciphertext, ua_secret, auth, salt, as_public)?;
    unpad_aesgcm(plaintext)
}

/// Decrypt encoder output directly, whichever coding produced it.
pub fn decrypt(content: &EncryptedContent, ua_secret: &SecretKey, auth: &[u8]) -> Result<Vec<u8>, EceError> {
    match content.encoding {
        ContentEncoding::Aes128Gcm => decrypt_aes128gcm(&content.body, ua_secret, auth),
        ContentEncoding::AesGcm => {
            decrypt_aesgcm(&content.body, ua_secret, auth, &content.salt, &content.sender_public)
        }
    }
}

/// Extract `salt` from an `Encryption` header and `dh` from a `Crypto-Key`
/// header. Parameters may be separated by `;` or `,`.
pub fn parse_crypto_headers(
    encryption: &str,
    crypto_key: &str,
) -> Result<([u8; SALT_LEN], Vec<u8>), EceError> {
    let salt = header_param(encryption, "salt")
        .ok_or_else(|| EceError::Malformed("Encryption header has no salt".into()))?;
    let dh = header_param(crypto_key, "dh")
        .ok_or_else(|| EceError::Malformed("Crypto-Key header has no dh".into()))?;

    let salt = b64url_decode(salt).map_err(|e| EceError::Malformed(format!("salt: {}", e)))?;
    let salt: [u8; SALT_LEN] = salt
        .as_slice()
        .try_into()
        .map_err(|_| EceError::Malformed(format!("salt must be {} bytes", SALT_LEN)))?;
    let dh = b64url_decode(dh).map_err(|e| EceError::Malformed(format!("dh: {}", e)))?;

    Ok((salt, dh))
}

fn header_param<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .split([';', ','])
        .filter_map(|part| part.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim().trim_matches('"'))
}

fn open_record(
    encoding: ContentEncoding,
    record: &[u8],
    ua_secret: &SecretKey,
    auth: &[u8],
    salt: &[u8; SALT_LEN],
    as_public: &[u8],
) -> Result<Vec<u8>, EceError> {
    let sender = parse_public_key(as_public)?;
    let ua_public = encode_public_key(&ua_secret.public_key());
    let as_public = encode_public_key(&sender);

    let shared = agree(ua_secret, &sender);
    let schedule = KeySchedule {
        ecdh_secret: shared.raw_secret_bytes().as_slice(),
        auth_secret: auth,
        ua_public: &ua_public,
        as_public: &as_public,
        salt,
    };
    let keys = derive_content_keys(encoding, &schedule)?;
    let plaintext = RecordCipher::new(&keys).open(record)?;

    tracing::trace!(encoding = %encoding, record_len = record.len(), "opened push record");
    Ok(plaintext)
}

/// Strip `0x02 || 0*` from the end of the record.
fn unpad_aes128gcm(mut plaintext: Vec<u8>) -> Result<Vec<u8>, EceError> {
    let delimiter_at = plaintext
        .iter()
        .rposition(|&b| b != 0)
        .ok_or_else(|| EceError::Malformed("record has no delimiter".into()))?;

    match plaintext[delimiter_at] {
        delimiters::LAST_RECORD => {
            plaintext.truncate(delimiter_at);
            Ok(plaintext)
        }
        delimiters::RECORD => Err(EceError::Malformed("record is not the final record".into())),
        other => Err(EceError::Malformed(format!("invalid padding delimiter 0x{:02x}", other))),
    }
}

/// Strip `pad u16 BE || 0^pad` from the front of the record.
fn unpad_aesgcm(plaintext: Vec<u8>) -> Result<Vec<u8>, EceError> {
    if plaintext.len() < 2 {
        return Err(EceError::Malformed("record too short for padding length".into()));
    }
    let pad_len = BigEndian::read_u16(&plaintext[..2]) as usize;
    let start = 2 + pad_len;
    if plaintext.len() < start {
        return Err(EceError::Malformed(format!("padding length {} exceeds record", pad_len)));
    }
    if plaintext[2..start].iter().any(|&b| b != 0) {
        return Err(EceError::Malformed("non-zero padding".into()));
    }
    Ok(plaintext[start..].to_vec())
}
