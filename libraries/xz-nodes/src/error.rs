/// Error types for node execution
use crate::value::PortType;
use thiserror::Error;
use xz_core::CoreError;
use xz_ffmpeg::FfmpegError;
use xz_mastering::MasteringError;
use xz_output::OutputError;
use xz_video::VideoError;

pub type Result<T> = std::result::Result<T, NodeError>;

/// Everything a node execution can fail with
///
/// The `Display` text is what the host shows to the user.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("{node}: missing required input '{input}'")]
    MissingInput { node: String, input: String },

    #[error("Input '{input}' expects {expected}, got {found}")]
    TypeMismatch {
        input: String,
        expected: PortType,
        found: PortType,
    },

    #[error("Input '{input}' has invalid choice '{value}' (expected one of: {})", .choices.join(", "))]
    InvalidChoice {
        input: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Input '{input}' value {value} is outside {min}..={max}")]
    OutOfRange {
        input: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Mastering(#[from] MasteringError),

    #[error(transparent)]
    Video(#[from] VideoError),

    #[error(transparent)]
    Ffmpeg(#[from] FfmpegError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
