use super::{DEFAULT_FILENAME_PREFIX, PREFIX_TOOLTIP, SUBFOLDER_TOOLTIP, VIDEO_CATEGORY};
use crate::cache::WorkflowCache;
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
use xz_output::OutputResolver;
use xz_video::{VideoEncoder, VideoRequest, X265Preset, DEFAULT_CRF, MAX_CRF};

const PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Encodes frames to H.265 in Matroska with workflow metadata
pub struct XVideoSave {
    encoder: VideoEncoder,
    workflow_cache: Arc<WorkflowCache>,
}

impl XVideoSave {
    pub fn new(ffmpeg: Arc<dyn FfmpegRunner>, workflow_cache: Arc<WorkflowCache>) -> Self {
        Self {
            encoder: VideoEncoder::new(ffmpeg),
            workflow_cache,
        }
    }

    fn request(inputs: &NodeInputs) -> Result<VideoRequest> {
        let crf = inputs.int("crf")?;
        let crf = u8::try_from(crf).map_err(|_| NodeError::OutOfRange {
            input: "crf".to_string(),
            value: crf as f64,
            min: 0.0,
            max: f64::from(MAX_CRF),
        })?;

        let name = inputs.string("preset")?;
        let preset: X265Preset = name.parse().map_err(|_| NodeError::InvalidChoice {
            input: "preset".to_string(),
            value: name.to_string(),
            choices: PRESETS.iter().map(|p| (*p).to_string()).collect(),
        })?;

        Ok(VideoRequest { crf, preset })
    }
}

#[async_trait]
impl Node for XVideoSave {
    fn schema(&self) -> NodeSchema {
        NodeSchema {
            id: "XVideoSave",
            display_name: "XVideoSave",
            category: VIDEO_CATEGORY,
            description: "Saves the input video to the output directory with H.265/HEVC encoding.",
            inputs: vec![
                InputSpec::video("video").tooltip("The video to save"),
                InputSpec::string("filename_prefix", DEFAULT_FILENAME_PREFIX)
                    .tooltip(PREFIX_TOOLTIP),
                InputSpec::string("subfolder", "Videos").tooltip(SUBFOLDER_TOOLTIP),
                InputSpec::int("crf", i64::from(DEFAULT_CRF), 0, i64::from(MAX_CRF))
                    .tooltip("Quality (0 is lossless). Higher is smaller and worse."),
                InputSpec::combo("preset", PRESETS, "medium")
                    .tooltip("x265 speed preset. Slower presets compress better."),
            ],
            outputs: vec![OutputSpec::new(
                "save_path",
                PortType::String,
                "Path relative to the output root",
            )],
            output_node: true,
        }
    }

    async fn execute(&self, ctx: &ExecutionContext, inputs: NodeInputs) -> Result<NodeOutputs> {
        let video = inputs.video("video")?;
        let request = Self::request(&inputs)?;
        request.validate()?;

        let target = OutputResolver::new(ctx.output_root())?.resolve(
            inputs.string("subfolder")?,
            inputs.string("filename_prefix")?,
            ".mkv",
        )?;
        let metadata = ctx.resolved_metadata(&self.workflow_cache).await;

        let outcome = self
            .encoder
            .encode(video, &request, &metadata, &target, ctx.progress.as_ref())
            .await?;
        info!(
            path = %outcome.file.display_path(),
            frames = outcome.frames,
            has_audio = outcome.has_audio,
            "Saved video"
        );

        Ok(NodeOutputs::new()
            .with("save_path", outcome.file.display_path())
            .with_saved_file(outcome.file))
    }
}
