// ## src/telemetry/snapshot.rs

//! Immutable per-message telemetry.
//!
//! Design notes:
//! - Attached to every `WebPushMessage`; serde so callers can ship it to
//!   whatever metrics sink they run.
//! - Holds sizes and timings only, never key material or plaintext.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_BODY_SIZE;
use crate::telemetry::counters::BuildCounters;
use crate::telemetry::timers::{BuildTimer, Stage, StageTimes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub bytes_plaintext: u64,
    pub bytes_padding: u64,
    pub bytes_framing: u64,
    pub bytes_tag: u64,
    pub bytes_body: u64,
    /// Body bytes per plaintext byte; 0.0 without a payload.
    pub expansion_ratio: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl BuildSnapshot {
    pub fn from(counters: &BuildCounters, timer: &BuildTimer) -> Self {
        let expansion_ratio = if counters.bytes_plaintext > 0 {
            counters.bytes_body as f64 / counters.bytes_plaintext as f64
        } else {
            0.0
        };

        Self {
            bytes_plaintext: counters.bytes_plaintext,
            bytes_padding: counters.bytes_padding,
            bytes_framing: counters.bytes_framing,
            bytes_tag: counters.bytes_tag,
            bytes_body: counters.bytes_body,
            expansion_ratio,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    pub fn overhead_bytes(&self) -> u64 {
        self.bytes_padding + self.bytes_framing + self.bytes_tag
    }

    /// Internal consistency:
    /// - body = plaintext + padding + framing + tag
    /// - body fits the push-service maximum
    /// - stage times fit inside the elapsed time
    pub fn sanity_check(&self) -> bool {
        self.bytes_body == self.bytes_plaintext + self.overhead_bytes()
            && self.bytes_body <= MAX_BODY_SIZE as u64
            && self.total_stage_time() <= self.elapsed
    }
}
