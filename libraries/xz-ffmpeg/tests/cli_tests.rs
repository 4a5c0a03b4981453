//! Tests against a real ffmpeg binary (skipped when none is installed)

use std::process::Command;
use xz_ffmpeg::{FfmpegCli, FfmpegError, FfmpegRunner, FilterGraph, FilterStage, Invocation};

fn is_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

macro_rules! require_ffmpeg {
    () => {
        if !is_ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not available");
            return;
        }
    };
}

#[tokio::test]
async fn version_reports_ffmpeg() {
    require_ffmpeg!();

    let version = FfmpegCli::default().version().await.unwrap();

    assert!(version.starts_with("ffmpeg version"), "got {version:?}");
}

#[tokio::test]
async fn loudnorm_report_lands_on_stderr() {
    require_ffmpeg!();

    let graph = FilterGraph::new().with(
        FilterStage::new("loudnorm")
            .param("I", -16)
            .param("print_format", "json"),
    );
    let invocation = Invocation::new()
        .args(["-f", "lavfi", "-i", "sine=frequency=1000:duration=1"])
        .audio_filter(&graph)
        .null_output();

    let output = FfmpegCli::default().run(invocation).await.unwrap();

    assert!(output.stderr.contains("\"input_i\""), "stderr: {}", output.stderr);
}

#[tokio::test]
async fn missing_input_is_an_exit_error() {
    require_ffmpeg!();

    let dir = tempfile::tempdir().unwrap();
    let invocation = Invocation::new()
        .input(dir.path().join("missing.wav"))
        .null_output();

    let err = FfmpegCli::default().run(invocation).await.unwrap_err();

    match err {
        FfmpegError::Exited { code, stderr } => {
            assert_ne!(code, Some(0));
            assert!(!stderr.is_empty());
        }
        other => panic!("expected exit error, got {other:?}"),
    }
}

#[tokio::test]
async fn stdin_payload_feeds_pipe_input() {
    require_ffmpeg!();

    // 4 frames of 2x2 RGB24
    let frames = bytes::Bytes::from(vec![128u8; 2 * 2 * 3 * 4]);
    let invocation = Invocation::new()
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-s", "2x2", "-r", "4"])
        .args(["-i", "pipe:0"])
        .with_stdin(frames)
        .null_output();

    let output = FfmpegCli::default().run(invocation).await.unwrap();

    assert!(output.stdout.is_empty());
}
