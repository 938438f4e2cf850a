use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::{DecodeError, Engine};
use chrono::{DateTime, Utc};

/// Unpadded base64url, the encoding used by every Web Push header and key.
pub fn b64url_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode base64url, tolerating trailing `=` padding and the standard
/// alphabet (`+`, `/`) some subscription stores still emit.
pub fn b64url_decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let normalized: String = input
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
/// Dates in the past yield a zero delay.
pub fn retry_after_from_str(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&Utc) - Utc::now();
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", b.iter().map(|x| format!("{:02x}", x)).collect::<String>())
    }
}
