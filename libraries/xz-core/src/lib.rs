//! Xz3r0 Core
//!
//! Host-agnostic media types, progress reporting, and error handling shared by
//! every Xz3r0 node crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Media Types**: `AudioBuffer`, `VideoFrames`, `ImageBatch`
//! - **Save Results**: `SavedFileDescriptor`, `WorkflowMetadata`
//! - **Progress**: the `ProgressSink` trait nodes report through
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use xz_core::AudioBuffer;
//!
//! // Two channels, planar layout as delivered by the host
//! let left = vec![0.0_f32, 0.5, -0.5];
//! let right = vec![0.0_f32, 0.25, -0.25];
//! let buffer = AudioBuffer::from_planar(&[left, right], 48_000).unwrap();
//!
//! assert_eq!(buffer.frames(), 3);
//! assert_eq!(buffer.channels(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod progress;
pub mod types;

pub use error::{CoreError, Result};
pub use progress::{NoopProgress, ProgressSink, ProgressUpdate};
pub use types::{
    AudioBuffer, ImageBatch, SavedFileDescriptor, SessionId, VideoFrames, WorkflowMetadata,
    IMAGE_CHANNELS,
};
