//! Result of resolving an output path
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a node saved (or will save) its file
///
/// Produced by the output resolver and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFileDescriptor {
    /// Absolute path inside the output root
    pub absolute_path: PathBuf,
    /// Path relative to the output root (safe to show to users)
    pub relative_path: PathBuf,
    /// Sequence number in 1..=99999
    pub sequence_number: u32,
    /// Sanitized subfolder, empty for the root itself
    pub subfolder: String,
    /// File name including extension
    pub filename: String,
}

impl SavedFileDescriptor {
    /// Relative path with forward slashes, as the host UI expects
    pub fn display_path(&self) -> String {
        if self.subfolder.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.subfolder, self.filename)
        }
    }
}
