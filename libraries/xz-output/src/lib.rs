//! Output path resolution for Xz3r0 save nodes
//!
//! Every save node writes `{prefix}_{NNNNN}{extension}` inside a single-level
//! subfolder of the host's output root. This crate turns the user-facing
//! template into that path:
//!
//! ```text
//! "Mix_%Y%%m%%d%" + "Audio"  ──►  expand datetime  ──►  sanitize  ──►  scan  ──►  <root>/Audio/Mix_20260114_00003.wav
//! ```
//!
//! The resolver never overwrites: it picks the lowest unused sequence number
//! and reserves nothing, so two calls without a write in between agree.
//!
//! # Example
//!
//! ```ignore
//! use xz_output::OutputResolver;
//!
//! let resolver = OutputResolver::new("/srv/comfy/output")?;
//! let target = resolver.resolve("Audio", "Mix_%Y%-%m%-%d%", ".wav")?;
//! println!("{}", target.display_path());
//! ```

#![deny(unsafe_code)]

mod error;
mod guard;
mod placeholders;
mod resolver;
mod sanitize;

pub use error::{OutputError, Result};
pub use guard::{ensure_vacant, OutputGuard};
pub use placeholders::{expand_datetime, expand_datetime_now, PLACEHOLDERS};
pub use resolver::{resolve, OutputResolver, MAX_SEQUENCE, SEQUENCE_WIDTH};
pub use sanitize::{sanitize_filename_prefix, sanitize_subfolder};
