// ## 📂 File: `src/message/options.rs`

//! src/message/options.rs
//! Per-message configuration.
//!
//! Design notes:
//! - Every field has a protocol default, so `MessageOptions::default()` is a
//!   valid configuration and a config file only lists what it overrides.
//! - Unknown fields are rejected to catch typos in hand-written configs.
//! - Values are validated by the builder, not here, so a loaded config and a
//!   fluent setter hit the same checks.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAD_LEN, DEFAULT_TTL, DEFAULT_VAPID_EXPIRY};
use crate::ece::ContentEncoding;
use crate::message::types::Urgency;
use crate::types::WebPushError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageOptions {
    /// Seconds the push service should hold an undelivered message.
    pub ttl: u32,
    pub urgency: Urgency,
    /// Replaces any pending message with the same topic.
    pub topic: Option<String>,
    pub content_encoding: ContentEncoding,
    /// VAPID `sub` claim (`mailto:` or `https:`).
    pub vapid_subject: Option<String>,
    /// VAPID token lifetime in seconds.
    pub vapid_expiry_secs: u64,
    /// Extra zero bytes appended to hide the payload length.
    pub pad_len: usize,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            urgency: Urgency::default(),
            topic: None,
            content_encoding: ContentEncoding::default(),
            vapid_subject: None,
            vapid_expiry_secs: DEFAULT_VAPID_EXPIRY.as_secs(),
            pad_len: DEFAULT_PAD_LEN,
        }
    }
}

impl MessageOptions {
    /// Load options from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, WebPushError> {
        serde_json::from_str(json)
            .map_err(|e| WebPushError::Other(format!("invalid message options: {}", e)))
    }
}
