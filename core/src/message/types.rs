// ## 📂 File: `src/message/types.rs`

use std::fmt;
use std::str::FromStr;

use p256::SecretKey;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::headers;
use crate::ece::{decrypt_aes128gcm, decrypt_aesgcm, parse_crypto_headers, ContentEncoding, EncryptedContent};
use crate::telemetry::BuildSnapshot;
use crate::types::WebPushError;
use crate::vapid::VapidSignature;

/// RFC 8030 §5.3 delivery urgency.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
}

impl Urgency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = WebPushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            other => Err(WebPushError::Other(format!("unknown urgency: {}", other))),
        }
    }
}

/// Encrypted body plus the headers its coding requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebPushPayload {
    pub content: Vec<u8>,
    pub content_encoding: ContentEncoding,
    /// `Encryption` and `Crypto-Key` for `aesgcm`; empty for `aes128gcm`.
    pub crypto_headers: Vec<(&'static str, String)>,
}

impl From<EncryptedContent> for WebPushPayload {
    fn from(content: EncryptedContent) -> Self {
        let crypto_headers = content.crypto_headers();
        Self { content: content.body, content_encoding: content.encoding, crypto_headers }
    }
}

impl WebPushPayload {
    fn crypto_header(&self, name: &str) -> Option<&str> {
        self.crypto_headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Receiver-side decryption, as the user agent would perform it.
    pub fn decrypt(&self, ua_secret: &SecretKey, auth: &[u8]) -> Result<Vec<u8>, WebPushError> {
        let plaintext = match self.content_encoding {
            ContentEncoding::Aes128Gcm => decrypt_aes128gcm(&self.content, ua_secret, auth)?,
            ContentEncoding::AesGcm => {
                let encryption = self.crypto_header(headers::ENCRYPTION).unwrap_or_default();
                let crypto_key = self.crypto_header(headers::CRYPTO_KEY).unwrap_or_default();
                let (salt, dh) = parse_crypto_headers(encryption, crypto_key)?;
                decrypt_aesgcm(&self.content, ua_secret, auth, &salt, &dh)?
            }
        };
        Ok(plaintext)
    }
}

/// A fully assembled push message. Immutable; owns all of its bytes.
#[derive(Clone, Debug)]
pub struct WebPushMessage {
    pub endpoint: Url,
    pub ttl: u32,
    pub urgency: Urgency,
    pub topic: Option<String>,
    pub content_encoding: ContentEncoding,
    /// `Authorization` header value: `vapid t=<jwt>, k=<key>` (RFC 8292)
    /// for `aes128gcm`, `WebPush <jwt>` for `aesgcm`, whose key travels
    /// as `p256ecdsa=` in `Crypto-Key` instead.
    pub authorization: String,
    /// `None` for a push without a body.
    pub payload: Option<WebPushPayload>,
    pub vapid: VapidSignature,
    pub snapshot: BuildSnapshot,
}

impl WebPushMessage {
    /// Request headers in emission order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            (headers::TTL, self.ttl.to_string()),
            (headers::URGENCY, self.urgency.to_string()),
        ];
        if let Some(topic) = &self.topic {
            out.push((headers::TOPIC, topic.clone()));
        }
        out.push((headers::AUTHORIZATION, self.authorization.clone()));

        let mut crypto_key = None;
        if let Some(payload) = &self.payload {
            out.push((headers::CONTENT_ENCODING, payload.content_encoding.to_string()));
            out.push((headers::CONTENT_TYPE, headers::OCTET_STREAM.to_string()));
            for (name, value) in &payload.crypto_headers {
                if *name == headers::CRYPTO_KEY {
                    crypto_key = Some(value.clone());
                } else {
                    out.push((*name, value.clone()));
                }
            }
        }

        // aesgcm announces the VAPID key next to the ECDH key.
        if self.content_encoding == ContentEncoding::AesGcm {
            let param = self.vapid.crypto_key_param();
            let value = match crypto_key {
                Some(dh) => format!("{};{}", dh, param),
                None => param,
            };
            out.push((headers::CRYPTO_KEY, value));
        }
        out
    }

    pub fn body(&self) -> &[u8] {
        self.payload.as_ref().map(|p| p.content.as_slice()).unwrap_or_default()
    }

    /// POST request ready for any `http`-compatible client.
    pub fn into_request(self) -> Result<http::Request<Vec<u8>>, WebPushError> {
        let mut builder = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.endpoint.as_str());
        for (name, value) in self.headers() {
            builder = builder.header(name, value);
        }

        let body = self.payload.map(|p| p.content).unwrap_or_default();
        builder
            .body(body)
            .map_err(|e| WebPushError::Unspecified(format!("request assembly failed: {}", e)))
    }
}
