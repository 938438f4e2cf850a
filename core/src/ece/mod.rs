//! ece/mod.rs
//! HTTP Encrypted Content-Encoding for push payloads.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
