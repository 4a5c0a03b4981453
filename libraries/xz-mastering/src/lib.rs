//! Xz3r0 audio mastering
//!
//! Mastering-grade WAV export built from ffmpeg's `acompressor` and
//! `loudnorm` filters:
//!
//! ```text
//! AudioBuffer ──► [acompressor] ──► loudnorm (two-pass) ──► 32-bit float WAV
//!                  threshold from     measured → corrected      + measured output
//!                  input loudness     linear | dynamic          loudness
//! ```
//!
//! # Features
//!
//! - **Adaptive compression**: three presets (Fast, Balanced, Slow) whose
//!   threshold follows the input's measured loudness
//! - **Two-pass normalization**: first pass measures, second pass applies the
//!   measured values so loudnorm can use its linear mode when the true-peak
//!   ceiling allows it
//! - **True-peak limiting**: ceiling between -6 and 0 dBTP, or relaxed to
//!   0 dBTP when disabled
//! - **Validation**: the rendered file is measured again and read back
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xz_core::NoopProgress;
//! use xz_ffmpeg::FfmpegCli;
//! use xz_mastering::{CompressionMode, CompressionSettings, MasteringPipeline, MasteringRequest};
//!
//! let request = MasteringRequest {
//!     compression: Some(CompressionSettings::new(CompressionMode::Fast)),
//!     ..Default::default()
//! };
//! let pipeline = MasteringPipeline::new(Arc::new(FfmpegCli::default()));
//! let outcome = pipeline.process(&audio, &request, &target, &NoopProgress).await?;
//! ```

#![deny(unsafe_code)]

mod error;
mod measurement;
mod params;
mod pipeline;
mod preset;
mod request;
mod wav;

pub use error::{MasteringError, Result};
pub use measurement::{parse_report, LoudnessMeasurement, ReportError, SILENCE_GATE_LUFS};
pub use params::{
    adaptive_threshold, analysis_stage, loudnorm_target, CompressorPlan, Normalization,
    NormalizationPlan, MAX_LOUDNORM_I, MAX_LOUDNORM_LRA, MAX_THRESHOLD_DB, MIN_LOUDNORM_I,
    MIN_LOUDNORM_LRA, MIN_THRESHOLD_DB, THRESHOLD_SLOPE,
};
pub use pipeline::{MasteringOutcome, MasteringPipeline, MasteringReport, Stage};
pub use preset::{CompressionMode, CompressionPreset};
pub use request::{
    CompressionSettings, MasteringRequest, OutputSampleRate, DEFAULT_PEAK_LIMIT_DB,
    DEFAULT_TARGET_LUFS, MAX_CUSTOM_RATIO, MAX_PEAK_LIMIT_DB, MAX_TARGET_LUFS, MIN_CUSTOM_RATIO,
    MIN_PEAK_LIMIT_DB, MIN_TARGET_LUFS, NORMALIZATION_DISABLED_LUFS,
};
pub use wav::{read_wav, write_float_wav};
