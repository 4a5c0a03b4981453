use super::{DEFAULT_FILENAME_PREFIX, FILE_PROCESSING_CATEGORY, PREFIX_TOOLTIP, SUBFOLDER_TOOLTIP};
use crate::cache::WorkflowCache;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::io::{NodeInputs, NodeOutputs};
use crate::node::Node;
use crate::schema::{InputSpec, NodeSchema, OutputSpec};
use crate::value::PortType;
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use xz_output::{OutputGuard, OutputResolver};

/// Archives the current workflow as pretty-printed JSON
pub struct XWorkflowSave {
    workflow_cache: Arc<WorkflowCache>,
}

impl XWorkflowSave {
    pub fn new(workflow_cache: Arc<WorkflowCache>) -> Self {
        Self { workflow_cache }
    }
}

#[async_trait]
impl Node for XWorkflowSave {
    fn schema(&self) -> NodeSchema {
        NodeSchema {
            id: "XWorkflowSave",
            display_name: "XWorkflowSave",
            category: FILE_PROCESSING_CATEGORY,
            description: "Saves the current workflow as a JSON file in the output directory.",
            inputs: vec![
                InputSpec::any("anything")
                    .tooltip("Any input. Only links the node into the workflow, never read."),
                InputSpec::string("filename_prefix", DEFAULT_FILENAME_PREFIX)
                    .tooltip(PREFIX_TOOLTIP),
                InputSpec::string("subfolder", "Workflows").tooltip(SUBFOLDER_TOOLTIP),
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
        let metadata = ctx.resolved_metadata(&self.workflow_cache).await;
        if metadata.is_empty() {
            warn!(session = %ctx.session, "No workflow metadata available, saving an empty document");
        }

        let target = OutputResolver::new(ctx.output_root())?.resolve(
            inputs.string("subfolder")?,
            inputs.string("filename_prefix")?,
            ".json",
        )?;

        let mut document = serde_json::to_string_pretty(&metadata)?;
        document.push('\n');

        write_new(&target.absolute_path, |mut file| async move {
            file.write_all(document.as_bytes()).await?;
            file.flush().await?;
            Ok(document.len())
        })
        .await?;

        info!(path = %target.display_path(), "Saved workflow");
        Ok(NodeOutputs::new()
            .with("save_path", target.display_path())
            .with_saved_file(target))
    }
}

/// Creates `path` exclusively and hands it to `write`. A failed write removes the file.
async fn write_new<F, Fut, T>(path: &Path, write: F) -> io::Result<T>
where
    F: FnOnce(File) -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let guard = OutputGuard::new(path);
    let written = write(file).await?;
    guard.disarm();
    Ok(written)
}
