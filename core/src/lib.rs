//! webpush-core
//!
//! Web Push message encryption and authentication engine.
//! Encrypts payloads for a browser subscription (RFC 8291 `aes128gcm` or
//! legacy `aesgcm`), signs VAPID tokens (RFC 8292) and assembles the request.
//! No network I/O.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod subscription;

// Layers, leaves first
pub mod crypto;
pub mod ece;
pub mod vapid;
pub mod message;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::ece::ContentEncoding;
    pub use crate::message::{MessageOptions, Urgency, WebPushMessage, WebPushMessageBuilder, WebPushPayload};
    pub use crate::subscription::{SubscriptionInfo, SubscriptionKeys};
    pub use crate::telemetry::BuildSnapshot;
    pub use crate::types::{ErrorInfo, WebPushError};
    pub use crate::vapid::{VapidKey, VapidSignature, VapidSignatureBuilder};
}
