//! Single-pass libx265 encode

use crate::error::{Result, VideoError};
use crate::request::VideoRequest;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use xz_core::{
    AudioBuffer, ProgressSink, ProgressUpdate, SavedFileDescriptor, VideoFrames, WorkflowMetadata,
};
use xz_ffmpeg::{FfmpegRunner, Invocation};
use xz_mastering::write_float_wav;
use xz_output::{ensure_vacant, OutputGuard};

/// Largest tag value passed with `-metadata`; bigger ones go through an
/// ffmetadata file to stay below the kernel's per-argument limit
pub const INLINE_METADATA_LIMIT: usize = 64 * 1024;

const STEPS: u32 = 3;

/// What was written
#[derive(Debug, Clone, PartialEq)]
pub struct VideoOutcome {
    pub file: SavedFileDescriptor,
    pub frames: usize,
    pub duration_secs: f64,
    pub has_audio: bool,
}

/// Encodes frames through an ffmpeg runner
#[derive(Clone)]
pub struct VideoEncoder {
    runner: Arc<dyn FfmpegRunner>,
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder").finish_non_exhaustive()
    }
}

impl VideoEncoder {
    pub fn new(runner: Arc<dyn FfmpegRunner>) -> Self {
        Self { runner }
    }

    /// Encode `video` into the Matroska file described by `target`
    pub async fn encode(
        &self,
        video: &VideoFrames,
        request: &VideoRequest,
        metadata: &WorkflowMetadata,
        target: &SavedFileDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<VideoOutcome> {
        request.validate()?;
        info!(
            width = video.width(),
            height = video.height(),
            frames = video.frame_count(),
            fps = video.frame_rate(),
            crf = request.crf,
            preset = %request.preset,
            "Encoding video to {}",
            target.display_path()
        );

        let output_path = &target.absolute_path;
        ensure_vacant(output_path)?;

        let workdir = tempfile::Builder::new().prefix("xz-video-").tempdir()?;
        let soundtrack = match video.audio() {
            Some(audio) => {
                let path = workdir.path().join("soundtrack.wav");
                write_soundtrack(path.clone(), audio.clone()).await?;
                Some(path)
            }
            None => None,
        };

        let tags = metadata.tags();
        let oversized = tags.iter().any(|(_, v)| v.len() > INLINE_METADATA_LIMIT);
        let metadata_file = if oversized {
            let path = workdir.path().join("metadata.txt");
            tokio::fs::write(&path, ffmetadata(&tags)).await?;
            debug!("Tags too large for the command line, using {}", path.display());
            Some(path)
        } else {
            None
        };
        report(progress, "prepare", 1);

        let invocation = build_invocation(
            video,
            request,
            soundtrack.as_deref(),
            metadata_file.as_deref(),
            if oversized { &[] } else { &tags },
            output_path,
        );

        let guard = OutputGuard::new(output_path);
        self.runner
            .run(invocation)
            .await
            .map_err(VideoError::Encode)?;
        guard.disarm();
        report(progress, "encode", 2);

        let frames = video.frame_count();
        let outcome = VideoOutcome {
            file: target.clone(),
            frames,
            duration_secs: frames as f64 / video.frame_rate(),
            has_audio: soundtrack.is_some(),
        };
        info!(
            frames,
            duration_secs = outcome.duration_secs,
            "Saved video {}",
            target.display_path()
        );
        report(progress, "done", STEPS);
        Ok(outcome)
    }
}

fn build_invocation(
    video: &VideoFrames,
    request: &VideoRequest,
    soundtrack: Option<&Path>,
    metadata_file: Option<&Path>,
    tags: &[(&'static str, String)],
    output: &Path,
) -> Invocation {
    let mut invocation = Invocation::new()
        .label("encode")
        .arg("-n")
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-s"])
        .arg(format!("{}x{}", video.width(), video.height()))
        .arg("-r")
        .arg(video.frame_rate().to_string())
        .args(["-i", "pipe:0"])
        .with_stdin(video.data().clone());

    let mut next_input = 1;
    let mut audio_input = None;
    if let Some(path) = soundtrack {
        invocation = invocation.input(path);
        audio_input = Some(next_input);
        next_input += 1;
    }
    let mut metadata_input = None;
    if let Some(path) = metadata_file {
        invocation = invocation.args(["-f", "ffmetadata"]).input(path);
        metadata_input = Some(next_input);
    }

    invocation = invocation.args(["-map", "0:v:0"]);
    if let Some(index) = audio_input {
        invocation = invocation.arg("-map").arg(format!("{}:a:0", index));
    }
    if let Some(index) = metadata_input {
        invocation = invocation.arg("-map_metadata").arg(index.to_string());
    }

    invocation = invocation
        .args(["-c:v", "libx265", "-pix_fmt", "yuv444p10le", "-crf"])
        .arg(request.crf.to_string())
        .arg("-preset")
        .arg(request.preset.as_str())
        .arg("-x265-params")
        .arg(request.x265_params());

    if audio_input.is_some() {
        invocation = invocation.args(["-c:a", "copy"]);
    }
    for (key, value) in tags {
        invocation = invocation.arg("-metadata").arg(format!("{}={}", key, value));
    }

    invocation.args(["-f", "matroska"]).arg(output)
}

/// FFMETADATA1 document with the given global tags
fn ffmetadata(tags: &[(&'static str, String)]) -> String {
    let mut doc = String::from(";FFMETADATA1\n");
    for (key, value) in tags {
        doc.push_str(&escape_ffmetadata(key));
        doc.push('=');
        doc.push_str(&escape_ffmetadata(value));
        doc.push('\n');
    }
    doc
}

fn escape_ffmetadata(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn write_soundtrack(path: PathBuf, audio: AudioBuffer) -> Result<()> {
    tokio::task::spawn_blocking(move || write_float_wav(&path, &audio))
        .await
        .map_err(|e| VideoError::Io(std::io::Error::other(e)))?
        .map_err(VideoError::Soundtrack)
}

fn report(progress: &dyn ProgressSink, stage: &str, step: u32) {
    progress.report(ProgressUpdate::new(stage, step, STEPS));
}
