//! Progress reporting
//!
//! Long-running nodes report absolute progress (`step` of `total`) the same way
//! the host's progress bar expects it. The sink is supplied per execution.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// A single absolute progress update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Short label of the stage that just completed
    pub stage: String,
    /// Steps completed so far
    pub step: u32,
    /// Total number of steps for this execution
    pub total: u32,
}

impl ProgressUpdate {
    pub fn new(stage: impl Into<String>, step: u32, total: u32) -> Self {
        Self {
            stage: stage.into(),
            step,
            total,
        }
    }

    /// Completed fraction in 0.0..=1.0
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.step as f32 / self.total as f32).min(1.0)
    }
}

/// Receiver of progress updates
///
/// Implementations must not block; updates are fire-and-forget.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Sink that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

impl ProgressSink for UnboundedSender<ProgressUpdate> {
    fn report(&self, update: ProgressUpdate) {
        // Receiver gone means nobody is watching
        let _ = self.send(update);
    }
}
