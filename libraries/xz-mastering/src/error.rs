//! Error types for the mastering pipeline

use crate::pipeline::Stage;
use thiserror::Error;
use xz_core::CoreError;
use xz_ffmpeg::FfmpegError;

/// Result type for mastering operations
pub type Result<T> = std::result::Result<T, MasteringError>;

/// Errors that can fail a mastering request
#[derive(Error, Debug)]
pub enum MasteringError {
    /// A request field is outside what the filter chain supports
    #[error("Unsupported parameter {name}: {reason}")]
    UnsupportedParameter { name: &'static str, reason: String },

    /// An ffmpeg pass exited abnormally or could not be started
    #[error("{stage} pass failed: {source}")]
    Pass {
        stage: Stage,
        #[source]
        source: FfmpegError,
    },

    /// An analysis pass produced no usable loudness report
    #[error("No usable loudness report from {stage} pass: {reason}")]
    Measurement {
        stage: Stage,
        reason: String,
        /// Raw ffmpeg stderr for troubleshooting
        diagnostics: String,
    },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MasteringError {
    pub(crate) fn unsupported(name: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Stage the failure happened in, when it came from a pass
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Pass { stage, .. } | Self::Measurement { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
