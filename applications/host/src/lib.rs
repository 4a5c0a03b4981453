//! Xz3r0 host library
//!
//! Configuration and command implementations behind the `xz-host` binary,
//! exposed for testing.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{Host, MasterArgs};
pub use config::HostConfig;
pub use error::{HostError, Result};
