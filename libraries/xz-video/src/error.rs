//! Error types for video encoding

use thiserror::Error;
use xz_core::CoreError;
use xz_ffmpeg::FfmpegError;
use xz_mastering::MasteringError;

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Unsupported parameter {name}: {reason}")]
    UnsupportedParameter { name: &'static str, reason: String },

    #[error("Video encode failed: {0}")]
    Encode(#[source] FfmpegError),

    #[error("Failed to write soundtrack: {0}")]
    Soundtrack(#[source] MasteringError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
