//! Pipeline tests against a scripted ffmpeg

use std::path::Path;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use xz_core::{AudioBuffer, NoopProgress, ProgressUpdate, SavedFileDescriptor};
use xz_ffmpeg::test_utils::FnRunner;
use xz_ffmpeg::{FfmpegError, Invocation, ProcessOutput};
use xz_mastering::{
    write_float_wav, CompressionMode, CompressionSettings, MasteringError, MasteringPipeline,
    MasteringRequest, Normalization, OutputSampleRate, Stage,
};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("xz_mastering=debug")
            .try_init();
    });
}

fn loudnorm_json(integrated: f64, true_peak: f64, lra: f64) -> String {
    format!(
        "[Parsed_loudnorm_1 @ 0x1]\n{{\n\t\"input_i\" : \"{:.2}\",\n\t\"input_tp\" : \"{:.2}\",\n\t\"input_lra\" : \"{:.2}\",\n\t\"input_thresh\" : \"{:.2}\",\n\t\"normalization_type\" : \"dynamic\",\n\t\"target_offset\" : \"0.00\"\n}}\n",
        integrated,
        true_peak,
        lra,
        integrated - 10.0
    )
}

fn sine(frames: usize) -> AudioBuffer {
    let samples: Vec<f32> = (0..frames)
        .flat_map(|i| {
            let v = (i as f32 * 0.05).sin() * 0.1;
            [v, v]
        })
        .collect();
    AudioBuffer::from_interleaved(samples, 2, 48_000).unwrap()
}

fn target(dir: &TempDir) -> SavedFileDescriptor {
    std::fs::create_dir(dir.path().join("Audio")).unwrap();
    SavedFileDescriptor {
        absolute_path: dir.path().join("Audio/Mix_00001.wav"),
        relative_path: Path::new("Audio/Mix_00001.wav").to_path_buf(),
        sequence_number: 1,
        subfolder: "Audio".to_string(),
        filename: "Mix_00001.wav".to_string(),
    }
}

/// Analysis passes answer with `input_lufs` (or `output_lufs` when measuring
/// the render), the render pass writes a short WAV.
fn scripted(input_lufs: f64, output_lufs: f64) -> FnRunner {
    FnRunner::new(move |invocation: &Invocation| {
        if invocation.name() == Stage::Render.as_str() {
            let path = invocation.output_path().expect("render has an output path");
            write_float_wav(path, &sine(480)).expect("write render output");
            return Ok(ProcessOutput::default());
        }
        let lufs = if invocation.name() == Stage::Validation.as_str() {
            output_lufs
        } else {
            input_lufs
        };
        Ok(ProcessOutput::with_stderr(loudnorm_json(lufs, lufs + 8.0, 3.0)))
    })
}

fn names(runner: &FnRunner) -> Vec<String> {
    runner
        .invocations()
        .iter()
        .map(|i| i.name().to_string())
        .collect()
}

fn render_graph(runner: &FnRunner) -> Option<String> {
    runner
        .invocations()
        .iter()
        .find(|i| i.name() == Stage::Render.as_str())
        .and_then(Invocation::audio_filter_text)
}

#[tokio::test]
async fn default_request_measures_renders_and_validates() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(scripted(-20.0, -14.1));
    let pipeline = MasteringPipeline::new(runner.clone());

    let outcome = pipeline
        .process(&sine(4800), &MasteringRequest::default(), &target, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(names(&runner), ["measurement", "render", "validation"]);
    assert!(target.absolute_path.exists());
    assert_eq!(outcome.measurement.integrated_lufs, -14.1);
    assert_eq!(outcome.audio.frames(), 480);
    assert_eq!(outcome.file, target);

    let graph = render_graph(&runner).unwrap();
    assert!(graph.starts_with("loudnorm=I=-14.10:TP=-1.10:LRA=7.00:measured_I=-20.00"));
    assert!(graph.ends_with("linear=true"), "graph: {graph}");
    assert!(matches!(outcome.normalization, Normalization::Applied(plan) if plan.linear));
}

#[tokio::test]
async fn render_writes_float_wav_at_requested_rate() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(scripted(-20.0, -14.1));

    let request = MasteringRequest {
        sample_rate: OutputSampleRate::Hz96000,
        ..Default::default()
    };
    MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &request, &target, &NoopProgress)
        .await
        .unwrap();

    let render = runner
        .invocations()
        .into_iter()
        .find(|i| i.name() == "render")
        .unwrap();
    assert!(render.has_arg("-n"), "render must refuse to overwrite");
    assert_eq!(render.value_of("-c:a").unwrap(), "pcm_f32le");
    assert_eq!(render.value_of("-ar").unwrap(), "96000");
    assert_eq!(render.value_of("-f").unwrap(), "wav");
    assert_eq!(render.output_path(), Some(target.absolute_path.as_path()));
}

#[tokio::test]
async fn minus_seventy_skips_loudnorm_entirely() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(scripted(-20.0, -20.0));

    let request = MasteringRequest {
        target_lufs: -70.0,
        ..Default::default()
    };
    let outcome = MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &request, &target, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(names(&runner), ["render", "validation"]);
    assert_eq!(render_graph(&runner), None);
    assert_eq!(outcome.normalization, Normalization::Disabled);
}

#[tokio::test]
async fn compression_derives_threshold_from_pre_measurement() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(scripted(-18.0, -14.1));

    let request = MasteringRequest {
        compression: Some(CompressionSettings::new(CompressionMode::Fast)),
        ..Default::default()
    };
    let outcome = MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &request, &target, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(
        names(&runner),
        ["pre-measurement", "measurement", "render", "validation"]
    );

    let plan = outcome.compression.unwrap();
    assert!((plan.threshold_db - -13.17).abs() < 1e-9);

    let invocations = runner.invocations();
    let measurement_graph = invocations[1].audio_filter_text().unwrap();
    assert!(measurement_graph.starts_with("acompressor=threshold=-13.17dB:ratio=3:"));
    assert!(measurement_graph.contains(",loudnorm="));

    let graph = render_graph(&runner).unwrap();
    let stages: Vec<&str> = graph.split(',').collect();
    assert_eq!(stages.len(), 2);
    assert!(stages[0].starts_with("acompressor="));
    assert!(stages[1].starts_with("loudnorm="));
}

#[tokio::test]
async fn compression_without_normalization_still_measures_input() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(scripted(-18.0, -17.0));

    let request = MasteringRequest {
        target_lufs: -70.0,
        compression: Some(CompressionSettings::new(CompressionMode::Slow).with_ratio(4.0)),
        ..Default::default()
    };
    MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &request, &target, &NoopProgress)
        .await
        .unwrap();

    assert_eq!(names(&runner), ["pre-measurement", "render", "validation"]);
    let graph = render_graph(&runner).unwrap();
    assert!(graph.starts_with("acompressor="));
    assert!(graph.contains(":ratio=4:"));
    assert!(!graph.contains("loudnorm"));
}

#[tokio::test]
async fn silent_input_skips_normalization() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(FnRunner::new(|invocation: &Invocation| {
        if let Some(path) = invocation.output_path() {
            write_float_wav(path, &sine(10)).unwrap();
            return Ok(ProcessOutput::default());
        }
        Ok(ProcessOutput::with_stderr(
            r#"{"input_i": "-inf", "input_tp": "-inf", "input_lra": "0.00", "input_thresh": "-inf", "target_offset": "inf"}"#,
        ))
    }));

    let request = MasteringRequest {
        compression: Some(CompressionSettings::new(CompressionMode::Balanced)),
        ..Default::default()
    };
    let outcome = MasteringPipeline::new(runner.clone())
        .process(
            &AudioBuffer::from_interleaved(vec![0.0; 960], 2, 48_000).unwrap(),
            &request,
            &target,
            &NoopProgress,
        )
        .await
        .unwrap();

    assert_eq!(outcome.normalization, Normalization::SkippedSilent);
    assert_eq!(outcome.compression, None);
    assert_eq!(render_graph(&runner), None);
}

#[tokio::test]
async fn render_failure_removes_partial_output() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(FnRunner::new(|invocation: &Invocation| {
        if let Some(path) = invocation.output_path() {
            std::fs::write(path, b"RIFF partial").unwrap();
            return Err(FfmpegError::Exited {
                code: Some(1),
                stderr: "Error while filtering: Invalid argument".to_string(),
            });
        }
        Ok(ProcessOutput::with_stderr(loudnorm_json(-20.0, -10.0, 3.0)))
    }));

    let err = MasteringPipeline::new(runner)
        .process(&sine(4800), &MasteringRequest::default(), &target, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MasteringError::Pass {
            stage: Stage::Render,
            ..
        }
    ));
    assert!(err.to_string().contains("Invalid argument"));
    assert!(!target.absolute_path.exists());
}

#[tokio::test]
async fn validation_failure_also_removes_output() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(FnRunner::new(|invocation: &Invocation| {
        if let Some(path) = invocation.output_path() {
            write_float_wav(path, &sine(10)).unwrap();
            return Ok(ProcessOutput::default());
        }
        if invocation.name() == "validation" {
            return Ok(ProcessOutput::with_stderr("nothing useful"));
        }
        Ok(ProcessOutput::with_stderr(loudnorm_json(-20.0, -10.0, 3.0)))
    }));

    let err = MasteringPipeline::new(runner)
        .process(&sine(4800), &MasteringRequest::default(), &target, &NoopProgress)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Validation));
    assert!(!target.absolute_path.exists());
}

#[tokio::test]
async fn unreadable_report_carries_diagnostics() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(FnRunner::new(|_: &Invocation| {
        Ok(ProcessOutput::with_stderr("[loudnorm] something odd happened"))
    }));

    let err = MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &MasteringRequest::default(), &target, &NoopProgress)
        .await
        .unwrap_err();

    match err {
        MasteringError::Measurement {
            stage, diagnostics, ..
        } => {
            assert_eq!(stage, Stage::Measurement);
            assert!(diagnostics.contains("something odd"));
        }
        other => panic!("expected measurement error, got {other:?}"),
    }
    assert_eq!(runner.call_count(), 1, "no render after a failed measurement");
}

#[tokio::test]
async fn invalid_request_runs_nothing() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let runner = Arc::new(FnRunner::succeeding());

    let request = MasteringRequest {
        peak_limit_db: -12.0,
        ..Default::default()
    };
    let err = MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &request, &target, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MasteringError::UnsupportedParameter {
            name: "peak_limit",
            ..
        }
    ));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn existing_target_is_left_alone() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    std::fs::write(&target.absolute_path, b"keep me").unwrap();
    let runner = Arc::new(scripted(-20.0, -14.1));

    let err = MasteringPipeline::new(runner.clone())
        .process(&sine(4800), &MasteringRequest::default(), &target, &NoopProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, MasteringError::Io(_)));
    assert_eq!(std::fs::read(&target.absolute_path).unwrap(), b"keep me");
    assert!(!names(&runner).contains(&"render".to_string()));
}

#[tokio::test]
async fn progress_reports_every_stage_in_order() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let target = target(&dir);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressUpdate>();

    MasteringPipeline::new(Arc::new(scripted(-20.0, -14.1)))
        .process(&sine(4800), &MasteringRequest::default(), &target, &tx)
        .await
        .unwrap();

    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    let steps: Vec<u32> = updates.iter().map(|u| u.step).collect();
    assert_eq!(steps, [1, 2, 3, 4, 5, 6, 7]);
    assert!(updates.iter().all(|u| u.total == 7));
    assert_eq!(updates.last().unwrap().stage, "done");
}
