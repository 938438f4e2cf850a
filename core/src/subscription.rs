//! subscription.rs
//! Browser-issued push subscription: endpoint URL plus the `p256dh` / `auth`
//! key pair obtained from `PushManager.subscribe()`.
//!
//! Design notes:
//! - Keys are validated once, at construction; everything downstream can
//!   assume an on-curve 65-byte point and an auth secret inside the bounds.
//! - Serde goes through the browser's JSON shape (`{"endpoint", "keys": {..}}`)
//!   with base64url strings, so a stored subscription deserializes directly.

use std::fmt;

use p256::PublicKey;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::crypto::{parse_public_key, validate_auth_secret, PUBLIC_KEY_LEN};
use crate::types::WebPushError;
use crate::utils::{b64url_decode, b64url_encode};

/// Validated subscriber key material.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKeys", into = "RawKeys")]
pub struct SubscriptionKeys {
    public_key: PublicKey,
    p256dh: [u8; PUBLIC_KEY_LEN],
    auth: Vec<u8>,
}

impl SubscriptionKeys {
    /// Build from raw bytes: `p256dh` must be an uncompressed P-256 point,
    /// `auth` a secret of 16..=64 bytes.
    pub fn new(p256dh: &[u8], auth: &[u8]) -> Result<Self, WebPushError> {
        let public_key = parse_public_key(p256dh)?;
        validate_auth_secret(auth)?;

        let mut raw = [0u8; PUBLIC_KEY_LEN];
        raw.copy_from_slice(p256dh);

        Ok(Self { public_key, p256dh: raw, auth: auth.to_vec() })
    }

    /// Build from the base64url strings a browser hands out.
    pub fn from_base64url(p256dh: &str, auth: &str) -> Result<Self, WebPushError> {
        let p256dh = b64url_decode(p256dh)
            .map_err(|e| WebPushError::InvalidSubscriptionKey(format!("p256dh: {}", e)))?;
        let auth = b64url_decode(auth)
            .map_err(|e| WebPushError::InvalidAuthSecret(format!("auth: {}", e)))?;
        Self::new(&p256dh, &auth)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Uncompressed subscriber key (`ua_public`).
    pub fn p256dh(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.p256dh
    }

    pub fn auth(&self) -> &[u8] {
        &self.auth
    }
}

impl fmt::Debug for SubscriptionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionKeys")
            .field("p256dh", &b64url_encode(self.p256dh))
            .field("auth_len", &self.auth.len())
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct RawKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p256dh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth: Option<String>,
}

impl TryFrom<RawKeys> for SubscriptionKeys {
    type Error = WebPushError;

    fn try_from(raw: RawKeys) -> Result<Self, Self::Error> {
        let p256dh = raw
            .p256dh
            .ok_or_else(|| WebPushError::InvalidSubscriptionKey("missing p256dh".into()))?;
        let auth = raw.auth.ok_or_else(|| WebPushError::InvalidAuthSecret("missing auth".into()))?;
        SubscriptionKeys::from_base64url(&p256dh, &auth)
    }
}

impl From<SubscriptionKeys> for RawKeys {
    fn from(keys: SubscriptionKeys) -> Self {
        RawKeys { p256dh: Some(b64url_encode(keys.p256dh)), auth: Some(b64url_encode(&keys.auth)) }
    }
}

/// A push subscription: where to deliver and how to encrypt for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubscription", into = "RawSubscription")]
pub struct SubscriptionInfo {
    endpoint: Url,
    keys: SubscriptionKeys,
}

impl SubscriptionInfo {
    /// Parse and validate all three browser-supplied values.
    pub fn new(endpoint: &str, p256dh: &str, auth: &str) -> Result<Self, WebPushError> {
        Self::from_parts(parse_endpoint(endpoint)?, SubscriptionKeys::from_base64url(p256dh, auth)?)
    }

    pub fn from_parts(endpoint: Url, keys: SubscriptionKeys) -> Result<Self, WebPushError> {
        check_scheme(&endpoint)?;
        Ok(Self { endpoint, keys })
    }

    /// Decode the JSON object returned by `PushSubscription.toJSON()`.
    ///
    /// Text that is not a JSON object of strings is `Other`; a missing
    /// `endpoint` is `InvalidUri`; missing keys keep their key kinds.
    pub fn from_json(json: &str) -> Result<Self, WebPushError> {
        let raw: RawSubscription = serde_json::from_str(json)
            .map_err(|e| WebPushError::Other(format!("subscription json: {}", e)))?;
        Self::try_from(raw)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn keys(&self) -> &SubscriptionKeys {
        &self.keys
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, WebPushError> {
    let url = Url::parse(endpoint)?;
    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> Result<(), WebPushError> {
    match url.scheme() {
        "https" | "http" if url.has_host() => Ok(()),
        "https" | "http" => Err(WebPushError::InvalidUri(format!("{} has no host", url))),
        other => Err(WebPushError::InvalidUri(format!("unsupported scheme: {}", other))),
    }
}

/// Browser JSON shape with every field optional, so absence is reported
/// as a typed error instead of a serde message.
#[derive(Clone, Serialize, Deserialize)]
struct RawSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keys: Option<RawKeys>,
}

impl TryFrom<RawSubscription> for SubscriptionInfo {
    type Error = WebPushError;

    fn try_from(raw: RawSubscription) -> Result<Self, Self::Error> {
        let endpoint = raw.endpoint.ok_or_else(|| WebPushError::InvalidUri("missing endpoint".into()))?;
        let keys = raw.keys.ok_or_else(|| WebPushError::InvalidSubscriptionKey("missing keys".into()))?;
        SubscriptionInfo::from_parts(parse_endpoint(&endpoint)?, SubscriptionKeys::try_from(keys)?)
    }
}

impl From<SubscriptionInfo> for RawSubscription {
    fn from(info: SubscriptionInfo) -> Self {
        RawSubscription { endpoint: Some(info.endpoint.to_string()), keys: Some(info.keys.into()) }
    }
}
