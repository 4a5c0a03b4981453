//! Running invocations to completion

use crate::error::{FfmpegError, Result};
use crate::invocation::Invocation;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured output of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    /// Lossily decoded stderr (filter reports land here)
    pub stderr: String,
}

impl ProcessOutput {
    pub fn with_stderr(stderr: impl Into<String>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }
}

/// Something that can execute an ffmpeg invocation
///
/// Implementations must await the process to completion. A non-zero exit is
/// an error carrying the captured stderr.
#[async_trait]
pub trait FfmpegRunner: Send + Sync {
    async fn run(&self, invocation: Invocation) -> Result<ProcessOutput>;
}

/// Runner that spawns the ffmpeg binary
///
/// The child is killed if the returned future is dropped, so host-side
/// cancellation never leaves an orphaned encoder behind.
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    ffmpeg_path: PathBuf,
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegCli {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// First line of `ffmpeg -version`
    pub async fn version(&self) -> Result<String> {
        let output = self
            .run(Invocation::new().label("version").arg("-version"))
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl FfmpegRunner for FfmpegCli {
    async fn run(&self, mut invocation: Invocation) -> Result<ProcessOutput> {
        debug!(stage = invocation.name(), "Running {}", invocation);
        let started = Instant::now();
        let payload = invocation.take_stdin();

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(invocation.argv())
            .stdin(if payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| FfmpegError::Spawn {
            path: self.ffmpeg_path.clone(),
            source,
        })?;

        // Feed stdin concurrently so a full stderr pipe can't deadlock the child
        let writer = match (payload, child.stdin.take()) {
            (Some(data), Some(mut stdin)) => Some(tokio::spawn(async move {
                stdin.write_all(&data).await?;
                stdin.shutdown().await
            })),
            _ => None,
        };

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code();
            warn!(
                stage = invocation.name(),
                ?code,
                "ffmpeg failed after {:?}",
                started.elapsed()
            );
            return Err(FfmpegError::Exited { code, stderr });
        }

        if let Some(writer) = writer {
            writer
                .await
                .map_err(|e| FfmpegError::Io(std::io::Error::other(e)))??;
        }

        debug!(
            stage = invocation.name(),
            "ffmpeg finished in {:?}",
            started.elapsed()
        );

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}
