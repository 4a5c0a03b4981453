//! Mastering request and its validation

use crate::error::{MasteringError, Result};
use crate::preset::{CompressionMode, CompressionPreset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target loudness that disables normalization
pub const NORMALIZATION_DISABLED_LUFS: f64 = -70.0;

pub const MIN_TARGET_LUFS: f64 = NORMALIZATION_DISABLED_LUFS;
pub const MAX_TARGET_LUFS: f64 = 0.0;
pub const MIN_PEAK_LIMIT_DB: f64 = -6.0;
pub const MAX_PEAK_LIMIT_DB: f64 = 0.0;
pub const MIN_CUSTOM_RATIO: f64 = 1.0;
pub const MAX_CUSTOM_RATIO: f64 = 20.0;

/// Streaming-platform loudness default
pub const DEFAULT_TARGET_LUFS: f64 = -14.1;
pub const DEFAULT_PEAK_LIMIT_DB: f64 = -1.1;

/// Sample rates the WAV render supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum OutputSampleRate {
    Hz44100,
    #[default]
    Hz48000,
    Hz96000,
    Hz192000,
}

impl OutputSampleRate {
    pub const ALL: [Self; 4] = [Self::Hz44100, Self::Hz48000, Self::Hz96000, Self::Hz192000];

    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
            Self::Hz96000 => 96_000,
            Self::Hz192000 => 192_000,
        }
    }
}

impl TryFrom<u32> for OutputSampleRate {
    type Error = MasteringError;

    fn try_from(hz: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.hz() == hz)
            .ok_or_else(|| {
                MasteringError::unsupported(
                    "sample_rate",
                    format!("{} Hz (expected 44100, 48000, 96000 or 192000)", hz),
                )
            })
    }
}

impl From<OutputSampleRate> for u32 {
    fn from(rate: OutputSampleRate) -> Self {
        rate.hz()
    }
}

impl fmt::Display for OutputSampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

/// Optional compression stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub mode: CompressionMode,
    /// Overrides the preset ratio when set
    pub custom_ratio: Option<f64>,
}

impl CompressionSettings {
    pub fn new(mode: CompressionMode) -> Self {
        Self {
            mode,
            custom_ratio: None,
        }
    }

    #[must_use]
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.custom_ratio = Some(ratio);
        self
    }

    pub fn preset(&self) -> CompressionPreset {
        self.mode.preset()
    }

    pub fn effective_ratio(&self) -> f64 {
        self.custom_ratio.unwrap_or(self.mode.preset().ratio)
    }
}

/// Everything the caller controls about one mastering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringRequest {
    /// Integrated loudness target, `-70` disables normalization
    pub target_lufs: f64,
    pub enable_peak_limiter: bool,
    /// True-peak ceiling in dBTP
    pub peak_limit_db: f64,
    pub compression: Option<CompressionSettings>,
    pub sample_rate: OutputSampleRate,
}

impl Default for MasteringRequest {
    fn default() -> Self {
        Self {
            target_lufs: DEFAULT_TARGET_LUFS,
            enable_peak_limiter: true,
            peak_limit_db: DEFAULT_PEAK_LIMIT_DB,
            compression: None,
            sample_rate: OutputSampleRate::default(),
        }
    }
}

impl MasteringRequest {
    /// Check every field against the ranges the filters accept
    pub fn validate(&self) -> Result<()> {
        check_range(
            "target_lufs",
            self.target_lufs,
            MIN_TARGET_LUFS,
            MAX_TARGET_LUFS,
        )?;
        check_range(
            "peak_limit",
            self.peak_limit_db,
            MIN_PEAK_LIMIT_DB,
            MAX_PEAK_LIMIT_DB,
        )?;
        if let Some(ratio) = self.compression.and_then(|c| c.custom_ratio) {
            check_range("custom_ratio", ratio, MIN_CUSTOM_RATIO, MAX_CUSTOM_RATIO)?;
        }
        Ok(())
    }

    pub fn normalization_enabled(&self) -> bool {
        self.target_lufs > NORMALIZATION_DISABLED_LUFS
    }

    /// Ceiling handed to loudnorm: the limit when limiting, 0 dBTP otherwise
    pub fn true_peak_ceiling(&self) -> f64 {
        if self.enable_peak_limiter {
            self.peak_limit_db
        } else {
            0.0
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(MasteringError::unsupported(
            name,
            format!("{} is outside {}..={}", value, min, max),
        ));
    }
    Ok(())
}
