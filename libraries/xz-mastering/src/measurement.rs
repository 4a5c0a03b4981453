//! Parsing ffmpeg's loudnorm analysis report
//!
//! loudnorm prints its measurements to stderr at the end of a run. With
//! `print_format=json` that is a flat JSON object whose values are strings
//! (`"-23.51"`, `"-inf"`); older builds and `print_format=summary` print an
//! aligned text table instead. Both layouts are accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Integrated loudness at or below this is treated as digital silence
pub const SILENCE_GATE_LUFS: f64 = -70.0;

/// Measured loudness of one analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessMeasurement {
    pub integrated_lufs: f64,
    pub loudness_range_lu: f64,
    pub true_peak_dbtp: f64,
    /// Gating threshold used for the integrated value
    pub threshold_lufs: f64,
    /// Gain loudnorm would still apply to reach the target
    pub offset_lu: f64,
}

impl LoudnessMeasurement {
    /// No gated loudness at all (silence or near-silence)
    pub fn is_silent(&self) -> bool {
        !self.integrated_lufs.is_finite() || self.integrated_lufs <= SILENCE_GATE_LUFS
    }
}

impl fmt::Display for LoudnessMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "I: {:.2} LUFS, LRA: {:.2} LU, TP: {:.2} dBTP, Thresh: {:.2} LUFS",
            self.integrated_lufs, self.loudness_range_lu, self.true_peak_dbtp, self.threshold_lufs
        )
    }
}

/// Why a report could not be read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("no loudnorm report found in ffmpeg output")]
    NotFound,

    #[error("field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("field '{field}' has unreadable value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// JSON keys and summary labels for each measured field
const FIELDS: [(&str, &str); 5] = [
    ("input_i", "Input Integrated"),
    ("input_lra", "Input LRA"),
    ("input_tp", "Input True Peak"),
    ("input_thresh", "Input Threshold"),
    ("target_offset", "Target Offset"),
];

/// Extract the measurement from a pass's stderr
pub fn parse_report(stderr: &str) -> Result<LoudnessMeasurement, ReportError> {
    match json_block(stderr) {
        Some(object) => from_json(&object),
        None => from_summary(stderr),
    }
}

/// Last JSON object that carries `input_i`
fn json_block(stderr: &str) -> Option<Map<String, Value>> {
    let key = stderr.rfind("\"input_i\"")?;
    let start = stderr[..key].rfind('{')?;
    let end = key + stderr[key..].find('}')?;
    match serde_json::from_str::<Value>(&stderr[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn from_json(object: &Map<String, Value>) -> Result<LoudnessMeasurement, ReportError> {
    let field = |index: usize| -> Result<f64, ReportError> {
        let (key, _) = FIELDS[index];
        match object.get(key) {
            None if key == "target_offset" => Ok(0.0),
            None => Err(ReportError::MissingField { field: key }),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ReportError::InvalidValue {
                field: key,
                value: n.to_string(),
            }),
            Some(Value::String(s)) => parse_number(s).ok_or_else(|| ReportError::InvalidValue {
                field: key,
                value: s.clone(),
            }),
            Some(other) => Err(ReportError::InvalidValue {
                field: key,
                value: other.to_string(),
            }),
        }
    };

    Ok(LoudnessMeasurement {
        integrated_lufs: field(0)?,
        loudness_range_lu: field(1)?,
        true_peak_dbtp: field(2)?,
        threshold_lufs: field(3)?,
        offset_lu: field(4)?,
    })
}

fn from_summary(stderr: &str) -> Result<LoudnessMeasurement, ReportError> {
    let lookup = |label: &'static str| -> Option<Result<f64, ReportError>> {
        let line = stderr
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with(label))?;
        let raw = line
            .split_once(':')
            .map(|(_, rest)| rest.split_whitespace().next().unwrap_or_default())
            .unwrap_or_default();
        Some(parse_number(raw).ok_or_else(|| ReportError::InvalidValue {
            field: label,
            value: raw.to_string(),
        }))
    };

    let Some(integrated) = lookup(FIELDS[0].1) else {
        return Err(ReportError::NotFound);
    };
    let required = |index: usize| {
        let (key, label) = FIELDS[index];
        lookup(label).unwrap_or(Err(ReportError::MissingField { field: key }))
    };

    Ok(LoudnessMeasurement {
        integrated_lufs: integrated?,
        loudness_range_lu: required(1)?,
        true_peak_dbtp: required(2)?,
        threshold_lufs: required(3)?,
        offset_lu: lookup(FIELDS[4].1).unwrap_or(Ok(0.0))?,
    })
}

/// Locale-independent number parsing, including `inf`/`-inf`
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => raw.parse::<f64>().ok().filter(|v| !v.is_nan()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_REPORT: &str = r#"[Parsed_loudnorm_0 @ 0x55d0c8f0a6c0]
{
	"input_i" : "-20.03",
	"input_tp" : "-5.12",
	"input_lra" : "1.40",
	"input_thresh" : "-30.04",
	"output_i" : "-14.12",
	"output_tp" : "-1.10",
	"output_lra" : "1.20",
	"output_thresh" : "-24.13",
	"normalization_type" : "dynamic",
	"target_offset" : "0.02"
}
"#;

    #[test]
    fn parses_json_report() {
        let m = parse_report(JSON_REPORT).unwrap();

        assert_eq!(m.integrated_lufs, -20.03);
        assert_eq!(m.true_peak_dbtp, -5.12);
        assert_eq!(m.loudness_range_lu, 1.40);
        assert_eq!(m.threshold_lufs, -30.04);
        assert_eq!(m.offset_lu, 0.02);
        assert!(!m.is_silent());
    }

    #[test]
    fn json_report_surrounded_by_log_noise() {
        let stderr = format!(
            "Input #0, wav, from 'in.wav':\n  Duration: 00:00:05.00\n{}size=N/A time=00:00:05.00\n",
            JSON_REPORT
        );
        assert_eq!(parse_report(&stderr).unwrap().integrated_lufs, -20.03);
    }

    #[test]
    fn numeric_and_infinite_values() {
        let stderr = r#"{"input_i": "-inf", "input_tp": -99, "input_lra": 0, "input_thresh": "-inf", "target_offset": "inf"}"#;
        let m = parse_report(stderr).unwrap();

        assert_eq!(m.integrated_lufs, f64::NEG_INFINITY);
        assert_eq!(m.true_peak_dbtp, -99.0);
        assert_eq!(m.offset_lu, f64::INFINITY);
        assert!(m.is_silent());
    }

    #[test]
    fn missing_offset_defaults_to_zero() {
        let stderr = r#"{"input_i": "-18.0", "input_tp": "-3.0", "input_lra": "5.0", "input_thresh": "-28.0"}"#;
        assert_eq!(parse_report(stderr).unwrap().offset_lu, 0.0);
    }

    #[test]
    fn missing_required_json_field() {
        let stderr = r#"{"input_i": "-18.0", "input_tp": "-3.0"}"#;
        assert_eq!(
            parse_report(stderr),
            Err(ReportError::MissingField { field: "input_lra" })
        );
    }

    #[test]
    fn unreadable_json_value() {
        let stderr = r#"{"input_i": "loud", "input_tp": "-3.0", "input_lra": "5.0", "input_thresh": "-28.0"}"#;
        assert!(matches!(
            parse_report(stderr),
            Err(ReportError::InvalidValue { field: "input_i", .. })
        ));
    }

    #[test]
    fn falls_back_to_summary_layout() {
        let stderr = "\
[Parsed_loudnorm_0 @ 0x1]
Input Integrated:    -23.4 LUFS
Input True Peak:      -4.0 dBTP
Input LRA:             2.3 LU
Input Threshold:     -33.6 LUFS

Output Integrated:   -14.1 LUFS
Output True Peak:     -1.1 dBTP
Output LRA:            2.1 LU
Output Threshold:    -24.2 LUFS

Normalization Type:   Dynamic
Target Offset:        +0.1 LU
";
        let m = parse_report(stderr).unwrap();

        assert_eq!(m.integrated_lufs, -23.4);
        assert_eq!(m.true_peak_dbtp, -4.0);
        assert_eq!(m.loudness_range_lu, 2.3);
        assert_eq!(m.threshold_lufs, -33.6);
        assert_eq!(m.offset_lu, 0.1);
    }

    #[test]
    fn no_report_at_all() {
        assert_eq!(
            parse_report("Conversion failed!\n"),
            Err(ReportError::NotFound)
        );
    }
}
