//! Parameter derivation between measurement and render
//!
//! ```text
//! measured loudness ──► adaptive threshold ──► acompressor stage
//!                   └─► corrected targets  ──► loudnorm second pass (linear | dynamic)
//! ```

use crate::measurement::LoudnessMeasurement;
use crate::preset::{CompressionMode, CompressionPreset};
use crate::request::{CompressionSettings, MasteringRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xz_ffmpeg::FilterStage;

/// How strongly the loudness gap moves the threshold
pub const THRESHOLD_SLOPE: f64 = 0.3;

/// acompressor threshold range in dB
pub const MIN_THRESHOLD_DB: f64 = -60.0;
pub const MAX_THRESHOLD_DB: f64 = 0.0;

/// loudnorm integrated target range
pub const MIN_LOUDNORM_I: f64 = -70.0;
pub const MAX_LOUDNORM_I: f64 = -5.0;

/// loudnorm loudness range target bounds
pub const MIN_LOUDNORM_LRA: f64 = 7.0;
pub const MAX_LOUDNORM_LRA: f64 = 20.0;

/// Bounds loudnorm accepts for `measured_*` and `offset`
const MEASURED_FLOOR: f64 = -99.0;
const MEASURED_CEIL: f64 = 99.0;

/// `actual + (actual - target) * 0.3 + base_offset`
pub fn adaptive_threshold(actual_lufs: f64, target_lufs: f64, base_offset_db: f64) -> f64 {
    actual_lufs + (actual_lufs - target_lufs) * THRESHOLD_SLOPE + base_offset_db
}

/// Integrated target clamped into loudnorm's accepted range
pub fn loudnorm_target(target_lufs: f64) -> f64 {
    let clamped = target_lufs.clamp(MIN_LOUDNORM_I, MAX_LOUDNORM_I);
    if clamped != target_lufs {
        warn!(
            requested = target_lufs,
            used = clamped,
            "Target loudness outside loudnorm range, clamping"
        );
    }
    clamped
}

/// Analysis-only loudnorm stage reporting JSON
pub fn analysis_stage(target_lufs: f64, true_peak_dbtp: f64) -> FilterStage {
    FilterStage::new("loudnorm")
        .param("I", fmt_db(target_lufs.clamp(MIN_LOUDNORM_I, MAX_LOUDNORM_I)))
        .param("TP", fmt_db(true_peak_dbtp))
        .param("print_format", "json")
}

/// Resolved compressor for one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorPlan {
    pub mode: CompressionMode,
    pub preset: CompressionPreset,
    pub ratio: f64,
    /// Threshold after clamping to the filter's range
    pub threshold_db: f64,
    /// Threshold straight from the formula
    pub derived_threshold_db: f64,
}

impl CompressorPlan {
    pub fn derive(settings: &CompressionSettings, measured_lufs: f64, target_lufs: f64) -> Self {
        let preset = settings.preset();
        let derived = adaptive_threshold(measured_lufs, target_lufs, preset.base_offset_db);
        let threshold_db = derived.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB);
        if threshold_db != derived {
            warn!(
                derived = %format!("{:.2}", derived),
                used = threshold_db,
                "Compressor threshold outside acompressor range, clamping"
            );
        }

        let plan = Self {
            mode: settings.mode,
            preset,
            ratio: settings.effective_ratio(),
            threshold_db,
            derived_threshold_db: derived,
        };
        debug!(
            mode = %plan.mode,
            ratio = plan.ratio,
            measured_lufs,
            target_lufs,
            "Adaptive threshold {:.2} dB",
            plan.threshold_db
        );
        plan
    }

    pub fn filter(&self) -> FilterStage {
        FilterStage::new("acompressor")
            .param("threshold", format!("{:.2}dB", self.threshold_db))
            .param("ratio", self.ratio)
            .param("attack", self.preset.attack_ms)
            .param("release", self.preset.release_ms)
            .param("knee", format!("{}dB", self.preset.knee_db))
            .param("makeup", format!("{}dB", self.preset.makeup_db))
            .param("link", "average")
            .param("detection", "peak")
    }
}

/// Second-pass loudnorm parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationPlan {
    pub target_lufs: f64,
    pub true_peak_dbtp: f64,
    pub loudness_range_lu: f64,
    pub measured: LoudnessMeasurement,
    /// Single gain change instead of loudnorm's dynamic mode
    pub linear: bool,
}

impl NormalizationPlan {
    pub fn correct(request: &MasteringRequest, measured: &LoudnessMeasurement) -> Self {
        let target_lufs = loudnorm_target(request.target_lufs);
        let true_peak_dbtp = request.true_peak_ceiling();
        let loudness_range_lu = measured
            .loudness_range_lu
            .clamp(MIN_LOUDNORM_LRA, MAX_LOUDNORM_LRA);

        // loudnorm decides from the values it parses out of the filter
        // arguments and refuses linear mode for degenerate measurements
        let passed = PassedMeasurement::from(measured);
        let projected_peak = passed.true_peak + (target_lufs - passed.integrated);
        let measurable = passed.true_peak != MEASURED_CEIL
            && passed.threshold != MIN_LOUDNORM_I
            && passed.loudness_range != 0.0
            && passed.integrated != 0.0;
        let linear = measurable
            && projected_peak <= true_peak_dbtp
            && passed.loudness_range <= loudness_range_lu;

        debug!(
            target_lufs,
            true_peak_dbtp,
            loudness_range_lu,
            projected_peak = %format!("{:.2}", projected_peak),
            linear,
            "Corrected loudnorm parameters"
        );

        Self {
            target_lufs,
            true_peak_dbtp,
            loudness_range_lu,
            measured: *measured,
            linear,
        }
    }

    pub fn filter(&self) -> FilterStage {
        let m = PassedMeasurement::from(&self.measured);
        FilterStage::new("loudnorm")
            .param("I", fmt_db(self.target_lufs))
            .param("TP", fmt_db(self.true_peak_dbtp))
            .param("LRA", fmt_db(self.loudness_range_lu))
            .param("measured_I", fmt_db(m.integrated))
            .param("measured_LRA", fmt_db(m.loudness_range))
            .param("measured_TP", fmt_db(m.true_peak))
            .param("measured_thresh", fmt_db(m.threshold))
            .param("offset", fmt_db(m.offset))
            .param("linear", self.linear)
    }
}

/// First-pass values clamped and rounded the way they reach loudnorm
#[derive(Debug, Clone, Copy)]
struct PassedMeasurement {
    integrated: f64,
    loudness_range: f64,
    true_peak: f64,
    threshold: f64,
    offset: f64,
}

impl From<&LoudnessMeasurement> for PassedMeasurement {
    fn from(m: &LoudnessMeasurement) -> Self {
        Self {
            integrated: round_db(m.integrated_lufs.clamp(MEASURED_FLOOR, 0.0)),
            loudness_range: round_db(m.loudness_range_lu.clamp(0.0, MEASURED_CEIL)),
            true_peak: round_db(m.true_peak_dbtp.clamp(MEASURED_FLOOR, MEASURED_CEIL)),
            threshold: round_db(m.threshold_lufs.clamp(MEASURED_FLOOR, 0.0)),
            offset: round_db(m.offset_lu.clamp(MEASURED_FLOOR, MEASURED_CEIL)),
        }
    }
}

fn round_db(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of the normalization decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Normalization {
    /// Target was -70 LUFS
    Disabled,
    /// Nothing measurable to normalize
    SkippedSilent,
    Applied(NormalizationPlan),
}

impl Normalization {
    pub fn plan(&self) -> Option<&NormalizationPlan> {
        match self {
            Self::Applied(plan) => Some(plan),
            _ => None,
        }
    }
}

fn fmt_db(value: f64) -> String {
    format!("{:.2}", value)
}
