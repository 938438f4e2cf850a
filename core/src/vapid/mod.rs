//! vapid/mod.rs
//! Voluntary Application Server Identification (RFC 8292).

pub mod types;
pub mod key;
pub mod signer;
pub mod builder;

pub use types::*;
pub use key::*;
pub use signer::*;
pub use builder::*;
