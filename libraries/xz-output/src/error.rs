//! Error types for output path resolution

use std::path::PathBuf;
use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while resolving an output path
#[derive(Error, Debug)]
pub enum OutputError {
    /// The user-supplied subfolder or prefix cannot be made safe
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Directory creation or listing failed
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every sequence number is taken
    #[error("No free sequence number left for '{prefix}' in {directory}")]
    SequenceExhausted { prefix: String, directory: PathBuf },
}

impl OutputError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
