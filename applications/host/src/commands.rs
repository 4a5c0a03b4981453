//! Command implementations

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use xz_core::{ProgressUpdate, SessionId, WorkflowMetadata};
use xz_ffmpeg::FfmpegRunner;
use xz_nodes::{
    ExecutionContext, NodeInputs, NodeOutputs, NodeRegistry, NodeServices, WorkflowCache,
    DEFAULT_FILENAME_PREFIX,
};

/// Options for mastering a WAV file through `XAudioSave`
#[derive(Debug, Clone, Args)]
pub struct MasterArgs {
    /// WAV file to master
    pub input: PathBuf,

    /// Filename prefix (datetime placeholders allowed)
    #[arg(short, long, default_value = DEFAULT_FILENAME_PREFIX)]
    pub prefix: String,

    /// Subfolder under the output root [default: Audio]
    #[arg(short, long)]
    pub subfolder: Option<String>,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = 48_000)]
    pub sample_rate: u32,

    /// Integrated loudness target, -70 disables normalization
    #[arg(long, default_value_t = xz_mastering::DEFAULT_TARGET_LUFS, allow_hyphen_values = true)]
    pub target_lufs: f64,

    /// True-peak ceiling in dBTP
    #[arg(long, default_value_t = xz_mastering::DEFAULT_PEAK_LIMIT_DB, allow_hyphen_values = true)]
    pub peak_limit: f64,

    /// Disable the true-peak limiter
    #[arg(long)]
    pub no_limiter: bool,

    /// Enable compression with this mode (Fast, Balanced, Slow)
    #[arg(long)]
    pub compression: Option<String>,

    /// Override the compression mode's ratio
    #[arg(long, requires = "compression")]
    pub ratio: Option<f64>,
}

impl MasterArgs {
    fn node_inputs(&self) -> NodeInputs {
        let mut inputs = NodeInputs::new()
            .with("filename_prefix", self.prefix.as_str())
            .with("sample_rate", self.sample_rate.to_string())
            .with("target_lufs", self.target_lufs)
            .with("enable_peak_limiter", !self.no_limiter)
            .with("peak_limit", self.peak_limit)
            .with("enable_compression", self.compression.is_some())
            .with("use_custom_ratio", self.ratio.is_some());
        if let Some(subfolder) = &self.subfolder {
            inputs.insert("subfolder", subfolder.as_str());
        }
        if let Some(mode) = &self.compression {
            inputs.insert("compression_mode", mode.as_str());
        }
        if let Some(ratio) = self.ratio {
            inputs.insert("custom_ratio", ratio);
        }
        inputs
    }
}

/// Registry plus the services one host process shares across executions
pub struct Host {
    registry: NodeRegistry,
    workflow_cache: Arc<WorkflowCache>,
    output_root: PathBuf,
}

impl Host {
    pub fn new(config: &HostConfig, ffmpeg: Arc<dyn FfmpegRunner>) -> Result<Self> {
        let workflow_cache = Arc::new(WorkflowCache::new(config.cache.capacity));
        let registry = NodeRegistry::with_builtin_nodes(NodeServices {
            ffmpeg,
            workflow_cache: workflow_cache.clone(),
        });
        Ok(Self {
            registry,
            workflow_cache,
            output_root: config.output_root()?,
        })
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// All node schemas as pretty JSON
    pub fn schemas_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.registry.schemas())
            .map_err(|e| HostError::Input(e.to_string()))
    }

    /// Master a WAV file, logging progress as it goes
    pub async fn master(&self, args: &MasterArgs) -> Result<NodeOutputs> {
        let path = args.input.clone();
        let audio = tokio::task::spawn_blocking(move || xz_mastering::read_wav(&path))
            .await
            .map_err(|e| HostError::Input(e.to_string()))?
            .map_err(|e| HostError::Input(format!("{}: {}", args.input.display(), e)))?;

        let inputs = args.node_inputs().with("audio", audio);
        self.run("XAudioSave", inputs, WorkflowMetadata::default()).await
    }

    /// Archive a workflow document through `XWorkflowSave`
    ///
    /// The document goes through the workflow cache the same way a
    /// browser-captured workflow would.
    pub async fn save_workflow(&self, workflow: Value, prefix: &str) -> Result<NodeOutputs> {
        let session = SessionId::generate();
        self.workflow_cache.store(session.clone(), workflow).await;

        let inputs = NodeInputs::new()
            .with("anything", Value::Null)
            .with("filename_prefix", prefix);
        let ctx = ExecutionContext::new(session.clone(), &self.output_root);
        let result = self.registry.execute("XWorkflowSave", &ctx, inputs).await;

        self.workflow_cache.end_session(&session).await;
        Ok(result?)
    }

    async fn run(
        &self,
        node: &str,
        inputs: NodeInputs,
        metadata: WorkflowMetadata,
    ) -> Result<NodeOutputs> {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();
        let logger = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                info!(
                    "[{}/{}] {}",
                    update.step, update.total, update.stage
                );
            }
        });

        let ctx = ExecutionContext::new(SessionId::generate(), &self.output_root)
            .with_metadata(metadata)
            .with_progress(Arc::new(tx));
        let result = self.registry.execute(node, &ctx, inputs).await;

        // Closing the last sender ends the logger
        drop(ctx);
        let _ = logger.await;
        Ok(result?)
    }
}
