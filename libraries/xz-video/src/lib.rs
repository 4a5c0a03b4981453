//! Xz3r0 video encode
//!
//! Encodes host frames with libx265 into Matroska in a single ffmpeg pass:
//! raw RGB24 frames go in on stdin, an optional soundtrack is muxed as-is,
//! and workflow metadata is stored as container tags.

#![deny(unsafe_code)]

mod encoder;
mod error;
mod request;

pub use encoder::{VideoEncoder, VideoOutcome, INLINE_METADATA_LIMIT};
pub use error::{Result, VideoError};
pub use request::{VideoRequest, X265Preset, DEFAULT_CRF, MAX_CRF};
