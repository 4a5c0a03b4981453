/// Core error types for Xz3r0 nodes
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing media values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Channel count outside what the pipeline can carry
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(usize),

    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Interleaved data does not split evenly into frames
    #[error("Sample count {samples} is not divisible by channel count {channels}")]
    RaggedSamples { samples: usize, channels: usize },

    /// Planar channels of different lengths
    #[error("Channel {channel} has {len} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        len: usize,
        expected: usize,
    },

    /// Video dimensions or frame data are inconsistent
    #[error("Invalid video frames: {0}")]
    InvalidVideo(String),

    /// Image dimensions or pixel data are inconsistent
    #[error("Invalid image batch: {0}")]
    InvalidImage(String),
}
