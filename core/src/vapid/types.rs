// ## 📂 File: `src/vapid/types.rs`

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// JWT claim set carried in a VAPID token. Field order on the wire is
/// `aud`, `exp`, `sub`, then any extra claims in key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapidClaims {
    /// Origin of the push service (`scheme://host[:port]`).
    pub aud: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Signed VAPID credentials for one push-service origin.
#[derive(Clone, PartialEq, Eq)]
pub struct VapidSignature {
    /// The signed JWT.
    pub auth_t: String,
    /// Base64url uncompressed sender public key.
    pub auth_k: String,
    /// `exp` claim of `auth_t`.
    pub expires_at: u64,
}

impl VapidSignature {
    /// `Authorization` value for the legacy `aesgcm` coding; the key travels
    /// separately as `p256ecdsa=` in `Crypto-Key`.
    pub fn authorization(&self) -> String {
        format!("WebPush {}", self.auth_t)
    }

    /// RFC 8292 `Authorization` value, used with `aes128gcm`.
    pub fn vapid_authorization(&self) -> String {
        format!("vapid t={}, k={}", self.auth_t, self.auth_k)
    }

    /// `Crypto-Key` parameter announcing the signing key.
    pub fn crypto_key_param(&self) -> String {
        format!("p256ecdsa={}", self.auth_k)
    }
}

impl fmt::Debug for VapidSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidSignature")
            .field("auth_k", &self.auth_k)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum VapidError {
    /// Private key could not be parsed or is not a P-256 scalar.
    InvalidKey(String),

    /// Token lifetime is zero or beyond the 24 h ceiling.
    InvalidExpiry { requested: Duration, max: Duration },

    /// Endpoint has no tuple origin.
    InvalidAudience(String),

    /// `sub` is neither `mailto:` nor `https:`, or a reserved claim was overridden.
    InvalidSubject(String),

    /// Token does not have three base64url segments or the header is wrong.
    MalformedToken(String),

    /// ES256 signature did not verify.
    BadSignature,

    /// Claim (de)serialization failed.
    Serialization(String),
}

impl fmt::Display for VapidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use VapidError::*;
        match self {
            InvalidKey(msg) =>
                write!(f, "invalid VAPID key: {}", msg),
            InvalidExpiry { requested, max } =>
                write!(f, "VAPID expiry of {}s outside 1..={}s", requested.as_secs(), max.as_secs()),
            InvalidAudience(msg) =>
                write!(f, "invalid VAPID audience: {}", msg),
            InvalidSubject(msg) =>
                write!(f, "invalid VAPID claims: {}", msg),
            MalformedToken(msg) =>
                write!(f, "malformed VAPID token: {}", msg),
            BadSignature =>
                write!(f, "VAPID signature verification failed"),
            Serialization(msg) =>
                write!(f, "VAPID claim serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for VapidError {}

impl From<serde_json::Error> for VapidError {
    fn from(e: serde_json::Error) -> Self {
        VapidError::Serialization(e.to_string())
    }
}
