//! telemetry/timers.rs
//! Stage timers for the build pipeline.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Option and subscription checks.
    Validate,
    /// Ephemeral sender key and salt drawn from the RNG.
    Randomize,
    /// ECDH, HKDF, padding, sealing and framing.
    Encrypt,
    /// VAPID token signing.
    Sign,
    /// Header and message assembly.
    Assemble,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Validate, Stage::Randomize, Stage::Encrypt, Stage::Sign, Stage::Assemble];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate  => "validate",
            Stage::Randomize => "randomize",
            Stage::Encrypt   => "encrypt",
            Stage::Sign      => "sign",
            Stage::Assemble  => "assemble",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn total(&self) -> Duration {
        self.times.values().copied().sum()
    }

    /// True when every listed stage was recorded, even if it took no measurable time.
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.times.contains_key(s))
    }
}

#[derive(Clone, Debug)]
pub struct BuildTimer {
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for BuildTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildTimer {
    pub fn new() -> Self {
        Self { start_time: Instant::now(), end_time: None, stage_times: StageTimes::default() }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Run `f`, charging its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.stage_times.add(stage, t.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }
}
