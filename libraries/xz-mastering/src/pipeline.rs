//! Mastering pipeline orchestration
//!
//! One request runs through these stages, each backed by at most one ffmpeg
//! pass:
//!
//! ```text
//! Received ─► PreMeasurement ─► Measurement ─► ParameterCorrection ─► Render ─► Validation ─► Done
//!  (write      (compression      (compressor     (linear/dynamic,      (WAV       (measure
//!   temp WAV)   only)             + loudnorm)     pure)                 f32)       output)
//! ```
//!
//! Skipped stages still report progress so the host bar moves monotonically.
//! Any failure ends the request; from the render onward the partial output
//! file is removed.

use crate::error::{MasteringError, Result};
use crate::measurement::{parse_report, LoudnessMeasurement};
use crate::params::{analysis_stage, CompressorPlan, Normalization, NormalizationPlan};
use crate::request::MasteringRequest;
use crate::wav::{read_wav, write_float_wav};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use xz_core::{AudioBuffer, ProgressSink, ProgressUpdate, SavedFileDescriptor};
use xz_ffmpeg::{FfmpegError, FfmpegRunner, FilterGraph, Invocation};
use xz_output::{ensure_vacant, OutputGuard};

/// Pipeline stage, used for progress labels and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    PreMeasurement,
    Measurement,
    ParameterCorrection,
    Render,
    Validation,
    Done,
}

impl Stage {
    pub const ALL: [Self; 7] = [
        Self::Received,
        Self::PreMeasurement,
        Self::Measurement,
        Self::ParameterCorrection,
        Self::Render,
        Self::Validation,
        Self::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::PreMeasurement => "pre-measurement",
            Self::Measurement => "measurement",
            Self::ParameterCorrection => "parameter correction",
            Self::Render => "render",
            Self::Validation => "validation",
            Self::Done => "done",
        }
    }

    /// 1-based position for progress reporting
    pub fn step(&self) -> u32 {
        Self::ALL.iter().position(|s| s == self).map_or(0, |i| i as u32 + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed mastering request
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringOutcome {
    /// Rendered audio read back from disk
    pub audio: AudioBuffer,
    pub file: SavedFileDescriptor,
    /// Loudness of the rendered file
    pub measurement: LoudnessMeasurement,
    /// Loudness of the raw input, when compression needed it
    pub input_measurement: Option<LoudnessMeasurement>,
    pub compression: Option<CompressorPlan>,
    pub normalization: Normalization,
}

impl MasteringOutcome {
    pub fn report(&self) -> MasteringReport {
        MasteringReport {
            path: self.file.display_path(),
            measurement: self.measurement,
            input_measurement: self.input_measurement,
            compression: self.compression,
            normalization: self.normalization,
        }
    }
}

/// Serializable summary for callers and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringReport {
    pub path: String,
    pub measurement: LoudnessMeasurement,
    pub input_measurement: Option<LoudnessMeasurement>,
    pub compression: Option<CompressorPlan>,
    pub normalization: Normalization,
}

/// Audio mastering over an ffmpeg runner
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use xz_ffmpeg::FfmpegCli;
/// use xz_mastering::{MasteringPipeline, MasteringRequest};
///
/// let pipeline = MasteringPipeline::new(Arc::new(FfmpegCli::default()));
/// let outcome = pipeline
///     .process(&audio, &MasteringRequest::default(), &target, &NoopProgress)
///     .await?;
/// println!("{}", outcome.measurement);
/// ```
#[derive(Clone)]
pub struct MasteringPipeline {
    runner: Arc<dyn FfmpegRunner>,
}

impl fmt::Debug for MasteringPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasteringPipeline").finish_non_exhaustive()
    }
}

impl MasteringPipeline {
    pub fn new(runner: Arc<dyn FfmpegRunner>) -> Self {
        Self { runner }
    }

    /// Master `audio` into the file described by `target`
    ///
    /// The target's parent directory must exist and the file must not.
    pub async fn process(
        &self,
        audio: &AudioBuffer,
        request: &MasteringRequest,
        target: &SavedFileDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<MasteringOutcome> {
        request.validate()?;
        info!(
            frames = audio.frames(),
            channels = audio.channels(),
            sample_rate = audio.sample_rate(),
            target_lufs = request.target_lufs,
            limiter = request.enable_peak_limiter,
            compression = request.compression.is_some(),
            "Mastering to {}",
            target.display_path()
        );

        let workdir = tempfile::Builder::new().prefix("xz-mastering-").tempdir()?;
        let input_path = workdir.path().join("input.wav");
        write_blocking(input_path.clone(), audio.clone()).await?;
        report(progress, Stage::Received);

        // Compression threshold depends on the raw input's loudness
        let mut input_measurement = None;
        let compression = match request.compression {
            Some(settings) => {
                let measured = self
                    .analyze(Stage::PreMeasurement, &input_path, &FilterGraph::new(), request)
                    .await?;
                input_measurement = Some(measured);
                if measured.is_silent() {
                    warn!("Input is silent, skipping compression");
                    None
                } else {
                    Some(CompressorPlan::derive(
                        &settings,
                        measured.integrated_lufs,
                        request.target_lufs,
                    ))
                }
            }
            None => None,
        };
        report(progress, Stage::PreMeasurement);

        let pre_graph = compression
            .map(|plan| FilterGraph::new().with(plan.filter()))
            .unwrap_or_default();

        let measured = if request.normalization_enabled() {
            Some(
                self.analyze(Stage::Measurement, &input_path, &pre_graph, request)
                    .await?,
            )
        } else {
            None
        };
        report(progress, Stage::Measurement);

        let normalization = match measured {
            None => Normalization::Disabled,
            Some(m) if m.is_silent() => {
                warn!("Measured loudness is silent, skipping normalization");
                Normalization::SkippedSilent
            }
            Some(m) => Normalization::Applied(NormalizationPlan::correct(request, &m)),
        };
        info!(
            normalization = ?normalization.plan().map(|p| if p.linear { "linear" } else { "dynamic" }),
            "Parameters ready"
        );
        report(progress, Stage::ParameterCorrection);

        let output_path = &target.absolute_path;
        ensure_vacant(output_path)?;
        let guard = OutputGuard::new(output_path);

        let mut render_graph = pre_graph;
        if let Some(plan) = normalization.plan() {
            render_graph.push(plan.filter());
        }
        let render = Invocation::new()
            .label(Stage::Render.as_str())
            .arg("-n")
            .input(&input_path)
            .audio_filter(&render_graph)
            .args(["-c:a", "pcm_f32le", "-ar"])
            .arg(request.sample_rate.hz().to_string())
            .args(["-f", "wav"])
            .arg(output_path);
        self.runner
            .run(render)
            .await
            .map_err(pass_error(Stage::Render))?;
        report(progress, Stage::Render);

        let measurement = self
            .analyze(Stage::Validation, output_path, &FilterGraph::new(), request)
            .await?;
        let rendered = read_blocking(output_path.clone()).await?;
        info!("Rendered {}", measurement);
        report(progress, Stage::Validation);

        guard.disarm();
        report(progress, Stage::Done);

        Ok(MasteringOutcome {
            audio: rendered,
            file: target.clone(),
            measurement,
            input_measurement,
            compression,
            normalization,
        })
    }

    /// Run an analysis pass (optional pre-filters + loudnorm) to the null muxer
    async fn analyze(
        &self,
        stage: Stage,
        input: &Path,
        pre_filters: &FilterGraph,
        request: &MasteringRequest,
    ) -> Result<LoudnessMeasurement> {
        let graph = pre_filters
            .clone()
            .with(analysis_stage(request.target_lufs, request.true_peak_ceiling()));
        let invocation = Invocation::new()
            .label(stage.as_str())
            .input(input)
            .audio_filter(&graph)
            .null_output();

        let output = self
            .runner
            .run(invocation)
            .await
            .map_err(pass_error(stage))?;

        let measurement =
            parse_report(&output.stderr).map_err(|e| MasteringError::Measurement {
                stage,
                reason: e.to_string(),
                diagnostics: output.stderr.clone(),
            })?;
        debug!(stage = %stage, "Measured {}", measurement);
        Ok(measurement)
    }
}

fn pass_error(stage: Stage) -> impl FnOnce(FfmpegError) -> MasteringError {
    move |source| MasteringError::Pass { stage, source }
}

fn report(progress: &dyn ProgressSink, stage: Stage) {
    progress.report(ProgressUpdate::new(
        stage.as_str(),
        stage.step(),
        Stage::ALL.len() as u32,
    ));
}

async fn write_blocking(path: PathBuf, audio: AudioBuffer) -> Result<()> {
    tokio::task::spawn_blocking(move || write_float_wav(&path, &audio))
        .await
        .map_err(|e| MasteringError::Io(std::io::Error::other(e)))?
}

async fn read_blocking(path: PathBuf) -> Result<AudioBuffer> {
    tokio::task::spawn_blocking(move || read_wav(&path))
        .await
        .map_err(|e| MasteringError::Io(std::io::Error::other(e)))?
}
