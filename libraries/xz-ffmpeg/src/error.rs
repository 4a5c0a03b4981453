/// Error types for ffmpeg invocations
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FfmpegError>;

/// Lines of stderr kept in the error message
const DIAGNOSTIC_LINES: usize = 12;

#[derive(Error, Debug)]
pub enum FfmpegError {
    #[error("Failed to start ffmpeg at {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", exited_message(*.code, .stderr))]
    Exited { code: Option<i32>, stderr: String },

    #[error("IO error talking to ffmpeg: {0}")]
    Io(#[from] std::io::Error),
}

impl FfmpegError {
    /// Full stderr of a failed run, if any
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Exited { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

fn exited_message(code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    };
    let tail = diagnostic_tail(stderr);
    if tail.is_empty() {
        format!("ffmpeg terminated with {}", status)
    } else {
        format!("ffmpeg terminated with {}: {}", status, tail)
    }
}

/// Last few non-empty lines, where ffmpeg puts the actual failure
fn diagnostic_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}
