// ## 📂 File: `src/vapid/builder.rs`

//! Fluent construction of a [`VapidSignature`] for one subscription.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use url::Url;

use crate::constants::DEFAULT_VAPID_EXPIRY;
use crate::subscription::SubscriptionInfo;
use crate::types::WebPushError;
use crate::vapid::key::VapidKey;
use crate::vapid::signer::VapidSigner;
use crate::vapid::types::{VapidError, VapidSignature};

const RESERVED_CLAIMS: [&str; 2] = ["aud", "exp"];

#[derive(Debug, Clone)]
pub struct VapidSignatureBuilder<'a> {
    endpoint: &'a Url,
    subject: Option<String>,
    expiry: Duration,
    extra: BTreeMap<String, serde_json::Value>,
}

impl<'a> VapidSignatureBuilder<'a> {
    pub fn new(subscription: &'a SubscriptionInfo) -> Self {
        Self::for_endpoint(subscription.endpoint())
    }

    pub fn for_endpoint(endpoint: &'a Url) -> Self {
        Self { endpoint, subject: None, expiry: DEFAULT_VAPID_EXPIRY, extra: BTreeMap::new() }
    }

    /// Contact URI (`mailto:` or `https:`).
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Token lifetime, at most 24 hours. Defaults to 12 hours.
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Extra private claim. A string `sub` is treated as [`subject`](Self::subject);
    /// `aud` and `exp` are derived and cannot be overridden.
    pub fn add_claim(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match (name.as_str(), value) {
            ("sub", serde_json::Value::String(sub)) => self.subject = Some(sub),
            (_, value) => {
                self.extra.insert(name, value);
            }
        }
        self
    }

    pub fn sign(&self, key: &VapidKey) -> Result<VapidSignature, WebPushError> {
        self.sign_at(key, Utc::now().timestamp().max(0) as u64)
    }

    /// Sign with an explicit clock reading (seconds since the Unix epoch).
    pub fn sign_at(&self, key: &VapidKey, now: u64) -> Result<VapidSignature, WebPushError> {
        if let Some(name) = self.extra.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(VapidError::InvalidSubject(format!("claim {:?} is derived and cannot be set", name)).into());
        }
        if let Some(value) = self.extra.get("sub") {
            return Err(VapidError::InvalidSubject(format!("sub must be a string, got {}", value)).into());
        }

        let mut claims = VapidSigner::claims_for(self.endpoint, self.subject.as_deref(), self.expiry, now)?;
        claims.extra = self.extra.clone();
        Ok(VapidSigner::sign_claims(key, &claims)?)
    }
}
