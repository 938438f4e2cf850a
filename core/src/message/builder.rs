// ## 📂 File: `src/message/builder.rs`

//! src/message/builder.rs
//! Orchestrates one push message: validate, encrypt, sign, assemble.
//!
//! Design notes:
//! - Setters never fail; all checks run once in `build()`, in a fixed order,
//!   and the first failure is returned. No partial message escapes.
//! - The size check runs before any key material is generated.
//! - No cryptography here: encryption is delegated to `ece`, signing to `vapid`.
//! - Stage timings and byte counts go into the message's `BuildSnapshot`.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::constants::{MAX_TOPIC_LEN, MAX_TTL};
use crate::crypto::{generate_salt, EphemeralKeyPair};
use crate::ece::{check_size, encrypt_with, ContentEncoding};
use crate::message::options::MessageOptions;
use crate::message::types::{Urgency, WebPushMessage, WebPushPayload};
use crate::subscription::SubscriptionInfo;
use crate::telemetry::{BuildCounters, BuildSnapshot, BuildTimer, Stage};
use crate::types::WebPushError;
use crate::vapid::{validate_expiry, validate_subject, VapidKey, VapidSigner};

#[derive(Debug, Clone)]
pub struct WebPushMessageBuilder<'a> {
    subscription: &'a SubscriptionInfo,
    vapid_key: &'a VapidKey,
    payload: Option<&'a [u8]>,
    options: MessageOptions,
}

impl<'a> WebPushMessageBuilder<'a> {
    pub fn new(subscription: &'a SubscriptionInfo, vapid_key: &'a VapidKey) -> Self {
        Self { subscription, vapid_key, payload: None, options: MessageOptions::default() }
    }

    pub fn payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.options.ttl = ttl;
        self
    }

    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.options.urgency = urgency;
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.options.topic = Some(topic.into());
        self
    }

    pub fn content_encoding(mut self, encoding: ContentEncoding) -> Self {
        self.options.content_encoding = encoding;
        self
    }

    pub fn vapid_subject(mut self, subject: impl Into<String>) -> Self {
        self.options.vapid_subject = Some(subject.into());
        self
    }

    pub fn vapid_expiry(mut self, expiry: Duration) -> Self {
        self.options.vapid_expiry_secs = expiry.as_secs();
        self
    }

    pub fn pad_len(mut self, pad_len: usize) -> Self {
        self.options.pad_len = pad_len;
        self
    }

    /// Replace every option at once, e.g. with a loaded config.
    pub fn options(mut self, options: MessageOptions) -> Self {
        self.options = options;
        self
    }

    /// Build with the operating system RNG.
    pub fn build(&self) -> Result<WebPushMessage, WebPushError> {
        self.build_with_rng(&mut OsRng)
    }

    pub fn build_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<WebPushMessage, WebPushError> {
        let opts = &self.options;
        let encoding = opts.content_encoding;
        let expiry = Duration::from_secs(opts.vapid_expiry_secs);

        let mut timer = BuildTimer::new();
        let mut counters = BuildCounters::default();

        // --- Validate ---
        timer.time(Stage::Validate, || -> Result<(), WebPushError> {
            validate_ttl(opts.ttl)?;
            if let Some(topic) = &opts.topic {
                validate_topic(topic)?;
            }
            if let Some(payload) = self.payload {
                check_size(encoding, payload.len(), opts.pad_len)?;
            }
            validate_expiry(expiry)?;
            if let Some(subject) = &opts.vapid_subject {
                validate_subject(subject)?;
            }
            Ok(())
        })?;

        // --- Randomize + Encrypt ---
        let payload = match self.payload {
            Some(plaintext) => {
                let (ephemeral, salt) = timer.time(Stage::Randomize, || {
                    let ephemeral = EphemeralKeyPair::generate(rng);
                    generate_salt(rng).map(|salt| (ephemeral, salt))
                })?;
                let content = timer.time(Stage::Encrypt, || {
                    encrypt_with(encoding, self.subscription.keys(), plaintext, opts.pad_len, &ephemeral, salt)
                })?;
                counters.add_content(&content);
                Some(WebPushPayload::from(content))
            }
            None => {
                counters.add_empty();
                None
            }
        };

        // --- Sign ---
        let now = Utc::now().timestamp().max(0) as u64;
        let vapid = timer.time(Stage::Sign, || {
            VapidSigner::sign(
                self.vapid_key,
                self.subscription.endpoint(),
                opts.vapid_subject.as_deref(),
                expiry,
                now,
            )
        })?;

        // --- Assemble ---
        // aes128gcm carries the key in Authorization, aesgcm in Crypto-Key.
        let authorization = timer.time(Stage::Assemble, || match encoding {
            ContentEncoding::Aes128Gcm => vapid.vapid_authorization(),
            ContentEncoding::AesGcm => vapid.authorization(),
        });
        timer.finish();

        let snapshot = BuildSnapshot::from(&counters, &timer);
        tracing::debug!(
            host = self.subscription.endpoint().host_str().unwrap_or_default(),
            encoding = %encoding,
            ttl = opts.ttl,
            urgency = %opts.urgency,
            body_len = snapshot.bytes_body,
            "built push message"
        );

        Ok(WebPushMessage {
            endpoint: self.subscription.endpoint().clone(),
            ttl: opts.ttl,
            urgency: opts.urgency,
            topic: opts.topic.clone(),
            content_encoding: encoding,
            authorization,
            payload,
            vapid,
            snapshot,
        })
    }
}

/// TTL is capped at 28 days; zero means "deliver now or drop".
pub fn validate_ttl(ttl: u32) -> Result<(), WebPushError> {
    if ttl > MAX_TTL {
        return Err(WebPushError::InvalidTtl(format!("ttl {}s exceeds {}s", ttl, MAX_TTL)));
    }
    Ok(())
}

/// 1..=32 characters of the URL-safe base64 alphabet.
pub fn validate_topic(topic: &str) -> Result<(), WebPushError> {
    if topic.is_empty() || topic.len() > MAX_TOPIC_LEN {
        return Err(WebPushError::InvalidTopic(format!(
            "length {} outside 1..={}",
            topic.len(),
            MAX_TOPIC_LEN
        )));
    }
    if let Some(c) = topic.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        return Err(WebPushError::InvalidTopic(format!("character {:?} not in the base64url alphabet", c)));
    }
    Ok(())
}
