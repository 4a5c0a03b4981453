//! Node registry and save nodes
//!
//! Nodes are registered statically with [`NodeRegistry::with_builtin_nodes`].
//! The host turns widget values into [`NodeInputs`], builds an
//! [`ExecutionContext`] per run and calls [`NodeRegistry::execute`], which
//! fills defaults and validates inputs against each node's [`NodeSchema`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xz_ffmpeg::FfmpegCli;
//! use xz_nodes::{ExecutionContext, NodeInputs, NodeRegistry, NodeServices, WorkflowCache};
//!
//! let registry = NodeRegistry::with_builtin_nodes(NodeServices {
//!     ffmpeg: Arc::new(FfmpegCli::default()),
//!     workflow_cache: Arc::new(WorkflowCache::new(64)),
//! });
//! let ctx = ExecutionContext::new(SessionId::generate(), "/srv/output");
//! let outputs = registry
//!     .execute("XAudioSave", &ctx, NodeInputs::new().with("audio", audio))
//!     .await?;
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod io;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod schema;
pub mod value;

pub use cache::WorkflowCache;
pub use context::ExecutionContext;
pub use error::{NodeError, Result};
pub use io::{NodeInputs, NodeOutputs};
pub use node::Node;
pub use nodes::{
    XAudioSave, XImageSave, XVideoSave, XWorkflowSave, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_FILENAME_PREFIX, MAX_COMPRESSION_LEVEL,
};
pub use registry::{NodeRegistry, NodeServices};
pub use schema::{InputSpec, NodeSchema, NumericRange, OutputSpec};
pub use value::{NodeValue, PortType};
