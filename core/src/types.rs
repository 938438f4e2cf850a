use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::CryptoError,
    ece::EceError,
    utils::retry_after_from_str,
    vapid::VapidError,
};

/// Unified error covering input validation, cryptographic failures and
/// push-service responses mapped back by the transport collaborator.
/// - Ergonomic `From<T>` impls enable `?` across the pipeline.
/// - Each kind is either permanent for its input or explicitly retryable;
///   see `is_retryable` and `is_subscription_gone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebPushError {
    /// Subscriber public key is not a 65-byte uncompressed P-256 point.
    #[error("invalid subscription key: {0}")]
    InvalidSubscriptionKey(String),

    /// Auth secret is empty, too short, too long or undecodable.
    #[error("invalid auth secret: {0}")]
    InvalidAuthSecret(String),

    /// Payload plus padding does not fit a single push record.
    #[error("payload too large: {have} bytes, at most {max} allowed")]
    PayloadTooLarge { have: usize, max: usize },

    /// TTL or VAPID expiry outside the protocol range.
    #[error("invalid ttl: {0}")]
    InvalidTtl(String),

    /// Topic longer than 32 characters or outside the base64url alphabet.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// VAPID private key is malformed or not a P-256 key.
    #[error("invalid crypto keys: {0}")]
    InvalidCryptoKeys(String),

    /// Endpoint is not an absolute http(s) URL.
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    /// Endpoint has no origin that can serve as a VAPID audience.
    #[error("invalid audience: {0}")]
    InvalidAudience(String),

    /// VAPID claims rejected (e.g. subject is not mailto: or https:).
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// Receive side: record could not be authenticated or unframed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Unexpected internal failure (RNG, AEAD seal, serialization).
    #[error("unspecified error: {0}")]
    Unspecified(String),

    /// 410: the subscription is gone, purge it.
    #[error("subscription is no longer registered")]
    NotRegistered,

    /// 404: the endpoint is unknown to the push service, purge it.
    #[error("endpoint not found")]
    EndpointNotFound,

    /// 401/403: VAPID credentials were rejected.
    #[error("unauthorized: push service rejected the credentials")]
    Unauthorized,

    /// 400 and other 4xx: badly formed request, optional service reason.
    #[error("bad request{}", fmt_reason(.0))]
    BadRequest(Option<String>),

    /// 429: rate limited, optionally with a Retry-After delay.
    #[error("too many requests")]
    TooManyRequests(Option<Duration>),

    /// 5xx: retryable, optionally with a Retry-After delay.
    #[error("push service error, try again later")]
    ServerError(Option<Duration>),

    /// Anything the taxonomy does not cover (e.g. 3xx).
    #[error("other: {0}")]
    Other(String),
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {}", r),
        None => String::new(),
    }
}

/// Error document returned by some push services on 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u16,
    pub errno: u16,
    pub error: String,
    #[serde(default)]
    pub message: String,
}

impl WebPushError {
    /// Map a push-service response into the taxonomy.
    ///
    /// `retry_after` is the raw `Retry-After` header value, `body` the raw
    /// response body. Success statuses map to `Ok(())`.
    pub fn from_response(
        status: u16,
        retry_after: Option<&str>,
        body: &[u8],
    ) -> Result<(), WebPushError> {
        let retry_after = retry_after.and_then(retry_after_from_str);

        let err = match status {
            200..=299 => return Ok(()),
            410 => WebPushError::NotRegistered,
            404 => WebPushError::EndpointNotFound,
            401 | 403 => WebPushError::Unauthorized,
            // The service does not echo the rejected size.
            413 => WebPushError::PayloadTooLarge {
                have: 0,
                max: crate::constants::MAX_BODY_SIZE,
            },
            429 => WebPushError::TooManyRequests(retry_after),
            400 => WebPushError::BadRequest(bad_request_reason(body)),
            400..=499 => WebPushError::BadRequest(Some(format!("unexpected status {}", status))),
            500..=599 => WebPushError::ServerError(retry_after),
            other => WebPushError::Other(format!("unexpected status {}", other)),
        };

        tracing::debug!(status, kind = err.short_description(), "push service rejected message");
        Err(err)
    }

    /// Caller may retry the same message later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebPushError::ServerError(_) | WebPushError::TooManyRequests(_))
    }

    /// Caller must stop sending to this subscription.
    pub fn is_subscription_gone(&self) -> bool {
        matches!(self, WebPushError::NotRegistered | WebPushError::EndpointNotFound)
    }

    /// Delay the push service asked for, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            WebPushError::ServerError(d) | WebPushError::TooManyRequests(d) => *d,
            _ => None,
        }
    }

    /// Stable identifier for logs and metrics.
    pub fn short_description(&self) -> &'static str {
        match self {
            WebPushError::InvalidSubscriptionKey(_) => "invalid_subscription_key",
            WebPushError::InvalidAuthSecret(_) => "invalid_auth_secret",
            WebPushError::PayloadTooLarge { .. } => "payload_too_large",
            WebPushError::InvalidTtl(_) => "invalid_ttl",
            WebPushError::InvalidTopic(_) => "invalid_topic",
            WebPushError::InvalidCryptoKeys(_) => "invalid_crypto_keys",
            WebPushError::InvalidUri(_) => "invalid_uri",
            WebPushError::InvalidAudience(_) => "invalid_audience",
            WebPushError::InvalidClaims(_) => "invalid_claims",
            WebPushError::DecryptionFailed(_) => "decryption_failed",
            WebPushError::Unspecified(_) => "unspecified",
            WebPushError::NotRegistered => "not_registered",
            WebPushError::EndpointNotFound => "endpoint_not_found",
            WebPushError::Unauthorized => "unauthorized",
            WebPushError::BadRequest(_) => "bad_request",
            WebPushError::TooManyRequests(_) => "too_many_requests",
            WebPushError::ServerError(_) => "server_error",
            WebPushError::Other(_) => "other",
        }
    }
}

fn bad_request_reason(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<ErrorInfo>(body) {
        Ok(info) => Some(info.error),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() { None } else { Some(text) }
        }
    }
}

impl From<CryptoError> for WebPushError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidPublicKey(msg) => WebPushError::InvalidSubscriptionKey(msg),
            CryptoError::InvalidAuthSecret { len } => WebPushError::InvalidAuthSecret(format!(
                "length {} outside {}..={}",
                len,
                crate::constants::MIN_AUTH_SECRET_LEN,
                crate::constants::MAX_AUTH_SECRET_LEN
            )),
            CryptoError::InvalidPrivateKey(msg) => WebPushError::InvalidCryptoKeys(msg),
            CryptoError::TagMismatch => WebPushError::DecryptionFailed(CryptoError::TagMismatch.to_string()),
            other => WebPushError::Unspecified(other.to_string()),
        }
    }
}

impl From<EceError> for WebPushError {
    fn from(e: EceError) -> Self {
        match e {
            EceError::PayloadTooLarge { have, max } => WebPushError::PayloadTooLarge { have, max },
            EceError::PaddingTooLarge { have, max } => WebPushError::PayloadTooLarge { have, max },
            EceError::Crypto(c) => c.into(),
            EceError::Malformed(msg) => WebPushError::DecryptionFailed(msg),
            EceError::Io(msg) => WebPushError::Unspecified(msg),
        }
    }
}

impl From<VapidError> for WebPushError {
    fn from(e: VapidError) -> Self {
        match e {
            VapidError::InvalidKey(msg) => WebPushError::InvalidCryptoKeys(msg),
            expiry @ VapidError::InvalidExpiry { .. } => WebPushError::InvalidTtl(expiry.to_string()),
            VapidError::InvalidAudience(msg) => WebPushError::InvalidAudience(msg),
            VapidError::InvalidSubject(msg) => WebPushError::InvalidClaims(msg),
            VapidError::MalformedToken(msg) => WebPushError::InvalidClaims(msg),
            VapidError::BadSignature => WebPushError::InvalidClaims(VapidError::BadSignature.to_string()),
            VapidError::Serialization(msg) => WebPushError::Unspecified(msg),
        }
    }
}

impl From<url::ParseError> for WebPushError {
    fn from(e: url::ParseError) -> Self {
        WebPushError::InvalidUri(e.to_string())
    }
}
