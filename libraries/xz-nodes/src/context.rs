//! Per-execution context supplied by the host

use crate::cache::WorkflowCache;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use xz_core::{NoopProgress, ProgressSink, SessionId, WorkflowMetadata};

/// What the host passes alongside a node's inputs
#[derive(Clone)]
pub struct ExecutionContext {
    pub session: SessionId,
    pub output_root: PathBuf,
    /// Hidden `prompt` / `workflow` inputs
    pub metadata: WorkflowMetadata,
    pub progress: Arc<dyn ProgressSink>,
}

impl ExecutionContext {
    pub fn new(session: SessionId, output_root: impl Into<PathBuf>) -> Self {
        Self {
            session,
            output_root: output_root.into(),
            metadata: WorkflowMetadata::default(),
            progress: Arc::new(NoopProgress),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: WorkflowMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Hidden metadata, with the session's cached workflow filling a gap
    pub async fn resolved_metadata(&self, cache: &WorkflowCache) -> WorkflowMetadata {
        let mut metadata = self.metadata.clone();
        if metadata.workflow.is_none() {
            metadata.workflow = cache.get(&self.session).await;
        }
        metadata
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("session", &self.session)
            .field("output_root", &self.output_root)
            .field("has_prompt", &self.metadata.prompt.is_some())
            .field("has_workflow", &self.metadata.workflow.is_some())
            .finish_non_exhaustive()
    }
}
