//! ffmpeg process seam for Xz3r0 nodes
//!
//! All media work is delegated to an external `ffmpeg` binary. This crate
//! keeps that boundary narrow:
//!
//! - [`FilterGraph`] / [`FilterStage`]: typed builder for ffmpeg's textual
//!   filter DSL (`name=k=v:k=v,name2=...`)
//! - [`Invocation`]: one argument vector plus optional stdin payload
//! - [`FfmpegRunner`]: async trait that runs an invocation to completion
//! - [`FfmpegCli`]: the real runner, built on `tokio::process`
//!
//! Enable the `test-utils` feature for [`test_utils::FnRunner`], a scripted
//! runner that records invocations instead of spawning processes.
//!
//! # Example
//!
//! ```ignore
//! use xz_ffmpeg::{FfmpegCli, FfmpegRunner, FilterGraph, FilterStage, Invocation};
//!
//! let graph = FilterGraph::new()
//!     .with(FilterStage::new("loudnorm").param("I", -14.1).param("print_format", "json"));
//! let invocation = Invocation::new().input("mix.wav").audio_filter(&graph).null_output();
//! let output = FfmpegCli::default().run(invocation).await?;
//! println!("{}", output.stderr);
//! ```

#![deny(unsafe_code)]

mod error;
mod filter;
mod invocation;
mod runner;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{FfmpegError, Result};
pub use filter::{FilterGraph, FilterStage};
pub use invocation::Invocation;
pub use runner::{FfmpegCli, FfmpegRunner, ProcessOutput};
