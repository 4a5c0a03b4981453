//! Scripted runner for tests that must not spawn ffmpeg

use crate::error::Result;
use crate::invocation::Invocation;
use crate::runner::{FfmpegRunner, ProcessOutput};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

type Handler = dyn Fn(&Invocation) -> Result<ProcessOutput> + Send + Sync;

/// Runner that answers every invocation with a closure and records it
///
/// The closure sees each invocation in order and can create output files,
/// return canned stderr reports, or fail a specific pass.
pub struct FnRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<Invocation>>,
}

impl FnRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Invocation) -> Result<ProcessOutput> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner that succeeds with empty output for everything
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ProcessOutput::default()))
    }

    /// Every invocation seen so far
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for FnRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRunner")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FfmpegRunner for FnRunner {
    async fn run(&self, invocation: Invocation) -> Result<ProcessOutput> {
        let result = (self.handler)(&invocation);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation);
        result
    }
}
