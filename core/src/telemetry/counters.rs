// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Byte accounting for a single message build.
//!
//! Summary: Records how the encrypted body splits into plaintext, padding,
//! framing and tag. Converted into an immutable `BuildSnapshot` at the end
//! of `build()`.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::crypto::TAG_LEN;
use crate::ece::EncryptedContent;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCounters {
    pub messages: u64,
    pub bytes_plaintext: u64,
    /// Zero padding plus the delimiter or length prefix.
    pub bytes_padding: u64,
    /// `aes128gcm` header block; zero for `aesgcm`.
    pub bytes_framing: u64,
    pub bytes_tag: u64,
    pub bytes_body: u64,
}

impl BuildCounters {
    /// Record one encrypted body.
    pub fn add_content(&mut self, content: &EncryptedContent) {
        self.messages += 1;
        self.bytes_plaintext += content.plaintext_len as u64;
        self.bytes_padding += (content.pad_len + content.encoding.padding_prefix_len()) as u64;
        self.bytes_framing += content.encoding.header_len() as u64;
        self.bytes_tag += TAG_LEN as u64;
        self.bytes_body += content.body.len() as u64;
    }

    /// Record a push without a body.
    pub fn add_empty(&mut self) {
        self.messages += 1;
    }

    /// Bytes in the body that are not plaintext.
    pub fn overhead_bytes(&self) -> u64 {
        self.bytes_padding + self.bytes_framing + self.bytes_tag
    }

    pub fn merge(&mut self, other: &BuildCounters) {
        self.messages += other.messages;
        self.bytes_plaintext += other.bytes_plaintext;
        self.bytes_padding += other.bytes_padding;
        self.bytes_framing += other.bytes_framing;
        self.bytes_tag += other.bytes_tag;
        self.bytes_body += other.bytes_body;
    }
}

impl AddAssign for BuildCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
