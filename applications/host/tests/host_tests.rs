//! Host configuration and commands against a scripted ffmpeg

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use xz_core::AudioBuffer;
use xz_ffmpeg::test_utils::FnRunner;
use xz_ffmpeg::{Invocation, ProcessOutput};
use xz_host::{Host, HostConfig, HostError, MasterArgs};
use xz_mastering::{write_float_wav, Stage};
use xz_nodes::NodeValue;

fn config_for(root: &Path) -> HostConfig {
    let mut config = HostConfig::default();
    config.output.root = root.to_path_buf();
    config
}

fn tone() -> AudioBuffer {
    let samples: Vec<f32> = (0..4_800)
        .flat_map(|i| {
            let v = (i as f32 * 0.06).sin() * 0.25;
            [v, -v]
        })
        .collect();
    AudioBuffer::from_interleaved(samples, 2, 48_000).unwrap()
}

fn fake_ffmpeg() -> FnRunner {
    FnRunner::new(|invocation: &Invocation| {
        if invocation.name() == Stage::Render.as_str() {
            write_float_wav(invocation.output_path().unwrap(), &tone()).unwrap();
            return Ok(ProcessOutput::default());
        }
        Ok(ProcessOutput::with_stderr(
            r#"{ "input_i" : "-16.00", "input_tp" : "-4.00", "input_lra" : "2.00", "input_thresh" : "-26.00", "target_offset" : "0.00" }"#,
        ))
    })
}

fn master_args(input: &Path) -> MasterArgs {
    MasterArgs {
        input: input.to_path_buf(),
        prefix: "Track".to_string(),
        subfolder: None,
        sample_rate: 48_000,
        target_lufs: -14.1,
        peak_limit: -1.1,
        no_limiter: false,
        compression: None,
        ratio: None,
    }
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xz-host.toml");
    std::fs::write(
        &path,
        format!(
            "[output]\nroot = \"{}\"\n\n[cache]\ncapacity = 5\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let config = HostConfig::load(Some(&path)).unwrap();

    assert_eq!(config.output.root, dir.path());
    assert_eq!(config.cache.capacity, 5);
    assert_eq!(config.ffmpeg.path, Path::new("ffmpeg"));
    config.validate().unwrap();
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = TempDir::new().unwrap();
    let err = HostConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
    assert!(matches!(err, HostError::Config(_)));
}

#[test]
fn validate_rejects_bad_settings() {
    let dir = TempDir::new().unwrap();

    let mut config = config_for(&dir.path().join("nope"));
    assert!(config.validate().unwrap_err().to_string().contains("not a directory"));

    config = config_for(dir.path());
    config.ffmpeg.path = dir.path().join("bin/ffmpeg");
    assert!(config.validate().unwrap_err().to_string().contains("FFmpeg not found"));

    config = config_for(dir.path());
    config.cache.capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn schemas_are_printable() {
    let dir = TempDir::new().unwrap();
    let host = Host::new(&config_for(dir.path()), Arc::new(FnRunner::succeeding())).unwrap();

    let json: serde_json::Value = serde_json::from_str(&host.schemas_json().unwrap()).unwrap();
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|schema| schema["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["XAudioSave", "XImageSave", "XVideoSave", "XWorkflowSave"]);
}

#[tokio::test]
async fn master_reads_wav_and_saves_under_audio() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    write_float_wav(&input, &tone()).unwrap();
    let output = dir.path().join("out");
    std::fs::create_dir(&output).unwrap();
    let runner = Arc::new(fake_ffmpeg());
    let host = Host::new(&config_for(&output), runner.clone()).unwrap();

    let outputs = host.master(&master_args(&input)).await.unwrap();

    assert_eq!(
        outputs.get("save_path").and_then(NodeValue::as_str),
        Some("Audio/Track_00001.wav")
    );
    assert!(output.join("Audio/Track_00001.wav").is_file());
    assert!(runner
        .invocations()
        .iter()
        .any(|i| i.name() == Stage::Render.as_str()));
}

#[tokio::test]
async fn master_reports_unreadable_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("not-audio.wav");
    std::fs::write(&input, b"hello").unwrap();
    let runner = Arc::new(fake_ffmpeg());
    let host = Host::new(&config_for(dir.path()), runner.clone()).unwrap();

    let err = host.master(&master_args(&input)).await.unwrap_err();

    assert!(matches!(err, HostError::Input(ref msg) if msg.contains("not-audio.wav")));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn workflow_document_is_archived() {
    let dir = TempDir::new().unwrap();
    let host = Host::new(&config_for(dir.path()), Arc::new(FnRunner::succeeding())).unwrap();

    let outputs = host
        .save_workflow(serde_json::json!({"nodes": [{"id": 7}]}), "Flow")
        .await
        .unwrap();

    assert_eq!(
        outputs.get("save_path").and_then(NodeValue::as_str),
        Some("Workflows/Flow_00001.json")
    );
    let saved: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("Workflows/Flow_00001.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["workflow"]["nodes"][0]["id"], 7);
    assert!(saved.get("prompt").is_none());
}
