//! message/mod.rs
//! Message configuration, assembly and HTTP request shaping.

pub mod options;
pub mod types;
pub mod builder;

pub use options::*;
pub use types::*;
pub use builder::*;
