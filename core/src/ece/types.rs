//! ece/types.rs
//! Content-coding registry and the encoder's output type.
//!
//! Notes:
//! - `aes128gcm` (RFC 8188 + RFC 8291) is self-describing: salt, record size
//!   and sender key live in a header block at the front of the body.
//! - `aesgcm` (draft-ietf-webpush-encryption-04) carries salt and sender key
//!   in the `Encryption` and `Crypto-Key` HTTP headers instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{headers, MAX_BODY_SIZE};
use crate::crypto::{CryptoError, PUBLIC_KEY_LEN, SALT_LEN, TAG_LEN};
use crate::utils::b64url_encode;

/// `aes128gcm` header block: salt(16) || rs(4) || idlen(1) || keyid(65).
pub const AES128GCM_HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;

/// Smallest record size RFC 8188 allows (one byte of content + delimiter + tag).
pub const MIN_RECORD_SIZE: u32 = 18;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncoding {
    /// Legacy draft scheme, still accepted by most push services.
    #[serde(rename = "aesgcm")]
    AesGcm,
    /// RFC 8291 scheme.
    #[default]
    #[serde(rename = "aes128gcm")]
    Aes128Gcm,
}

impl ContentEncoding {
    /// Value of the `Content-Encoding` header.
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentEncoding::AesGcm => "aesgcm",
            ContentEncoding::Aes128Gcm => "aes128gcm",
        }
    }

    /// Bytes placed in front of the sealed record.
    pub const fn header_len(self) -> usize {
        match self {
            ContentEncoding::AesGcm => 0,
            ContentEncoding::Aes128Gcm => AES128GCM_HEADER_LEN,
        }
    }

    /// Fixed padding overhead inside the record (excluding the zero bytes):
    /// the 0x02 delimiter for `aes128gcm`, the u16 length prefix for `aesgcm`.
    pub const fn padding_prefix_len(self) -> usize {
        match self {
            ContentEncoding::AesGcm => 2,
            ContentEncoding::Aes128Gcm => 1,
        }
    }

    /// Total body length for a payload of `payload_len` with `pad_len` zeros.
    pub const fn body_len(self, payload_len: usize, pad_len: usize) -> usize {
        self.header_len() + payload_len + self.padding_prefix_len() + pad_len + TAG_LEN
    }

    /// Largest payload that still fits a single record of `MAX_BODY_SIZE`.
    pub const fn max_payload_len(self, pad_len: usize) -> usize {
        MAX_BODY_SIZE.saturating_sub(self.body_len(0, pad_len))
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncoding {
    type Err = EceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aesgcm" => Ok(ContentEncoding::AesGcm),
            "aes128gcm" => Ok(ContentEncoding::Aes128Gcm),
            other => Err(EceError::Malformed(format!("unknown content encoding: {}", other))),
        }
    }
}

/// Encoder output: the body plus the coding parameters that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedContent {
    pub encoding: ContentEncoding,
    pub body: Vec<u8>,
    pub salt: [u8; SALT_LEN],
    /// Ephemeral sender public key (`as_public`, the `dh` / keyid value).
    pub sender_public: [u8; PUBLIC_KEY_LEN],
    pub plaintext_len: usize,
    pub pad_len: usize,
}

impl EncryptedContent {
    /// Headers this coding requires next to the body.
    pub fn crypto_headers(&self) -> Vec<(&'static str, String)> {
        match self.encoding {
            ContentEncoding::Aes128Gcm => Vec::new(),
            ContentEncoding::AesGcm => vec![
                (headers::ENCRYPTION, format!("salt={}", b64url_encode(self.salt))),
                (headers::CRYPTO_KEY, format!("dh={}", b64url_encode(self.sender_public))),
            ],
        }
    }

    /// Bytes that are not plaintext: framing, padding and tag.
    pub fn overhead_len(&self) -> usize {
        self.body.len() - self.plaintext_len
    }
}

#[derive(Debug)]
pub enum EceError {
    /// Payload (with the requested padding) would push the body past the
    /// push-service maximum; `max` is the largest payload that still fits.
    PayloadTooLarge { have: usize, max: usize },

    /// Padding does not fit the 2-byte length field.
    PaddingTooLarge { have: usize, max: usize },

    /// Key agreement, derivation or AEAD failure.
    Crypto(CryptoError),

    /// Received body or header could not be parsed.
    Malformed(String),

    /// Buffer write failure while framing.
    Io(String),
}

impl fmt::Display for EceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EceError::PayloadTooLarge { have, max } =>
                write!(f, "payload of {} bytes exceeds the {} byte limit", have, max),
            EceError::PaddingTooLarge { have, max } =>
                write!(f, "padding length {} exceeds {}", have, max),
            EceError::Crypto(e) => write!(f, "crypto error: {}", e),
            EceError::Malformed(msg) => write!(f, "malformed content: {}", msg),
            EceError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for EceError {}

impl From<CryptoError> for EceError {
    fn from(e: CryptoError) -> Self {
        EceError::Crypto(e)
    }
}

impl From<std::io::Error> for EceError {
    fn from(e: std::io::Error) -> Self {
        EceError::Io(e.to_string())
    }
}
