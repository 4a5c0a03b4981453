use super::{DEFAULT_FILENAME_PREFIX, FILE_PROCESSING_CATEGORY, PREFIX_TOOLTIP, SUBFOLDER_TOOLTIP};
use crate::context::ExecutionContext;
use crate::error::{NodeError, Result};
use crate::io::{NodeInputs, NodeOutputs};
use crate::node::Node;
use crate::schema::{InputSpec, NodeSchema, OutputSpec};
use crate::value::PortType;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use xz_ffmpeg::FfmpegRunner;
use xz_mastering::{
    CompressionMode, CompressionSettings, MasteringPipeline, MasteringRequest, OutputSampleRate,
    DEFAULT_PEAK_LIMIT_DB, DEFAULT_TARGET_LUFS, MAX_CUSTOM_RATIO, MAX_PEAK_LIMIT_DB,
    MAX_TARGET_LUFS, MIN_CUSTOM_RATIO, MIN_PEAK_LIMIT_DB, MIN_TARGET_LUFS,
};
use xz_output::OutputResolver;

const SAMPLE_RATES: &[&str] = &["44100", "48000", "96000", "192000"];
const COMPRESSION_MODES: &[&str] = &["Fast", "Balanced", "Slow"];

/// Masters audio and saves it as 32-bit float WAV
pub struct XAudioSave {
    pipeline: MasteringPipeline,
}

impl XAudioSave {
    pub fn new(ffmpeg: Arc<dyn FfmpegRunner>) -> Self {
        Self {
            pipeline: MasteringPipeline::new(ffmpeg),
        }
    }

    /// Translate validated widget values into a mastering request
    fn request(inputs: &NodeInputs) -> Result<MasteringRequest> {
        let rate = inputs.string("sample_rate")?;
        let sample_rate = rate
            .parse::<u32>()
            .ok()
            .and_then(|hz| OutputSampleRate::try_from(hz).ok())
            .ok_or_else(|| invalid_choice("sample_rate", rate, SAMPLE_RATES))?;

        let compression = if inputs.boolean("enable_compression")? {
            let name = inputs.string("compression_mode")?;
            let mode: CompressionMode = name
                .parse()
                .map_err(|_| invalid_choice("compression_mode", name, COMPRESSION_MODES))?;
            let settings = CompressionSettings::new(mode);
            Some(if inputs.boolean("use_custom_ratio")? {
                settings.with_ratio(inputs.float("custom_ratio")?)
            } else {
                settings
            })
        } else {
            None
        };

        Ok(MasteringRequest {
            target_lufs: inputs.float("target_lufs")?,
            enable_peak_limiter: inputs.boolean("enable_peak_limiter")?,
            peak_limit_db: inputs.float("peak_limit")?,
            compression,
            sample_rate,
        })
    }
}

fn invalid_choice(input: &str, value: &str, choices: &[&str]) -> NodeError {
    NodeError::InvalidChoice {
        input: input.to_string(),
        value: value.to_string(),
        choices: choices.iter().map(|c| (*c).to_string()).collect(),
    }
}

#[async_trait]
impl Node for XAudioSave {
    fn schema(&self) -> NodeSchema {
        NodeSchema {
            id: "XAudioSave",
            display_name: "XAudioSave",
            category: FILE_PROCESSING_CATEGORY,
            description: "Masters audio (optional compression, loudness normalization, \
                          true-peak limiting) and saves it as a 32-bit float WAV file.",
            inputs: vec![
                InputSpec::audio("audio").tooltip("Input audio"),
                InputSpec::string("filename_prefix", DEFAULT_FILENAME_PREFIX)
                    .tooltip(PREFIX_TOOLTIP),
                InputSpec::string("subfolder", "Audio").tooltip(SUBFOLDER_TOOLTIP),
                InputSpec::combo("sample_rate", SAMPLE_RATES, "48000")
                    .tooltip("Target sample rate for the output audio file"),
                InputSpec::float(
                    "target_lufs",
                    DEFAULT_TARGET_LUFS,
                    MIN_TARGET_LUFS,
                    MAX_TARGET_LUFS,
                    0.1,
                )
                .tooltip("Integrated loudness target in LUFS. Set to -70 to disable."),
                InputSpec::boolean("enable_peak_limiter", true)
                    .tooltip("Enable true-peak limiting"),
                InputSpec::float(
                    "peak_limit",
                    DEFAULT_PEAK_LIMIT_DB,
                    MIN_PEAK_LIMIT_DB,
                    MAX_PEAK_LIMIT_DB,
                    0.1,
                )
                .tooltip("True-peak ceiling in dBTP, used when the limiter is enabled"),
                InputSpec::boolean("enable_compression", false)
                    .tooltip("Apply dynamic range compression before normalization"),
                InputSpec::combo("compression_mode", COMPRESSION_MODES, "Balanced")
                    .tooltip("Compressor character"),
                InputSpec::boolean("use_custom_ratio", false)
                    .tooltip("Override the mode's compression ratio"),
                InputSpec::float("custom_ratio", 2.0, MIN_CUSTOM_RATIO, MAX_CUSTOM_RATIO, 0.1)
                    .tooltip("Compression ratio, used when use_custom_ratio is enabled"),
            ],
            outputs: vec![
                OutputSpec::new("processed_audio", PortType::Audio, "The mastered audio"),
                OutputSpec::new("save_path", PortType::String, "Path relative to the output root"),
                OutputSpec::new("loudness", PortType::Json, "Measured loudness of the saved file"),
            ],
            output_node: true,
        }
    }

    async fn execute(&self, ctx: &ExecutionContext, inputs: NodeInputs) -> Result<NodeOutputs> {
        let audio = inputs.audio("audio")?;
        let request = Self::request(&inputs)?;
        // Reject bad parameters before any directory is created
        request.validate()?;

        let target = OutputResolver::new(ctx.output_root())?.resolve(
            inputs.string("subfolder")?,
            inputs.string("filename_prefix")?,
            ".wav",
        )?;

        let outcome = self
            .pipeline
            .process(audio, &request, &target, ctx.progress.as_ref())
            .await?;
        info!(
            path = %outcome.file.display_path(),
            integrated_lufs = outcome.measurement.integrated_lufs,
            true_peak_dbtp = outcome.measurement.true_peak_dbtp,
            "Saved mastered audio"
        );

        let loudness = serde_json::to_value(outcome.measurement)?;
        Ok(NodeOutputs::new()
            .with("processed_audio", outcome.audio)
            .with("save_path", outcome.file.display_path())
            .with("loudness", loudness)
            .with_saved_file(outcome.file))
    }
}
