//! Runtime configuration
//!
//! Tunables for the runtime, with optional serde derives and a TOML
//! loader behind the `toml` feature.

pub mod types;

pub use types::*;
