//! Protocol constants and defaults.
//!
//! Values here are fixed by RFC 8030 (push protocol), RFC 8188 (HTTP-ECE),
//! RFC 8291 (Web Push encryption) and RFC 8292 (VAPID). Defaults seed
//! `MessageOptions::default()`.

use std::time::Duration;

/// Maximum HTTP body a push service must accept (RFC 8030 §7.2).
pub const MAX_BODY_SIZE: usize = 4096;

/// Record size written into the `aes128gcm` header block.
pub const RECORD_SIZE: u32 = 4096;

/// Padding length is carried in a 2-byte field.
pub const MAX_PAD_LEN: usize = u16::MAX as usize;

/// Defaults
pub const DEFAULT_TTL: u32 = 24 * 60 * 60; // 1 day
pub const DEFAULT_PAD_LEN: usize = 0;
pub const DEFAULT_VAPID_EXPIRY: Duration = Duration::from_secs(12 * 60 * 60);

/// RFC 8292 §2: `exp` must not be more than 24 hours from the request time.
pub const MAX_VAPID_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Largest TTL accepted by the major push services (28 days).
pub const MAX_TTL: u32 = 28 * 24 * 60 * 60;

/// RFC 8030 §5.4: topics are at most 32 characters of the base64url alphabet.
pub const MAX_TOPIC_LEN: usize = 32;

/// Auth secret bounds. Browsers issue 16 bytes.
pub const MIN_AUTH_SECRET_LEN: usize = 16;
pub const MAX_AUTH_SECRET_LEN: usize = 64;

/// HKDF info labels (each is NUL-terminated on the wire).
pub mod info {
    pub const WEBPUSH_INFO: &[u8] = b"WebPush: info\0";
    pub const AES128GCM: &[u8] = b"Content-Encoding: aes128gcm\0";
    pub const AESGCM: &[u8] = b"Content-Encoding: aesgcm\0";
    pub const NONCE: &[u8] = b"Content-Encoding: nonce\0";
    pub const AUTH: &[u8] = b"Content-Encoding: auth\0";
    pub const P256_LABEL: &[u8] = b"P-256\0";
}

/// Record delimiters (RFC 8188 §2).
pub mod delimiters {
    pub const LAST_RECORD: u8 = 0x02;
    pub const RECORD: u8 = 0x01;
}

/// HTTP header names emitted by the message builder.
pub mod headers {
    pub const TTL: &str = "TTL";
    pub const URGENCY: &str = "Urgency";
    pub const TOPIC: &str = "Topic";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ENCRYPTION: &str = "Encryption";
    pub const CRYPTO_KEY: &str = "Crypto-Key";

    pub const OCTET_STREAM: &str = "application/octet-stream";
}
