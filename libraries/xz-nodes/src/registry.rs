//! Static node registry
//!
//! Every node type is listed explicitly in [`NodeRegistry::with_builtin_nodes`];
//! there is no discovery at runtime. The registry also owns input
//! validation so nodes can rely on well-typed, in-range inputs.

use crate::cache::WorkflowCache;
use crate::context::ExecutionContext;
use crate::error::{NodeError, Result};
use crate::io::{NodeInputs, NodeOutputs};
use crate::node::Node;
use crate::nodes::{XAudioSave, XImageSave, XVideoSave, XWorkflowSave};
use crate::schema::{InputSpec, NodeSchema};
use crate::value::{NodeValue, PortType};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use xz_ffmpeg::FfmpegRunner;

/// Shared services the built-in nodes need
#[derive(Clone)]
pub struct NodeServices {
    pub ffmpeg: Arc<dyn FfmpegRunner>,
    pub workflow_cache: Arc<WorkflowCache>,
}

impl fmt::Debug for NodeServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeServices")
            .field("workflow_cache", &self.workflow_cache)
            .finish_non_exhaustive()
    }
}

/// Registry of node types by id
#[derive(Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Arc<dyn Node>>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in save node
    pub fn with_builtin_nodes(services: NodeServices) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(XAudioSave::new(services.ffmpeg.clone())));
        registry.register(Arc::new(XImageSave::new(services.workflow_cache.clone())));
        registry.register(Arc::new(XVideoSave::new(
            services.ffmpeg.clone(),
            services.workflow_cache.clone(),
        )));
        registry.register(Arc::new(XWorkflowSave::new(services.workflow_cache)));
        registry
    }

    /// Register a node under its schema id, replacing any previous one
    pub fn register(&mut self, node: Arc<dyn Node>) {
        let id = node.schema().id;
        self.nodes.insert(id, node);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn schemas(&self) -> Vec<NodeSchema> {
        self.nodes.values().map(|node| node.schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate `inputs` against the node's schema and run it
    pub async fn execute(
        &self,
        id: &str,
        ctx: &ExecutionContext,
        inputs: NodeInputs,
    ) -> Result<NodeOutputs> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| NodeError::UnknownNode(id.to_string()))?;
        let schema = node.schema();
        let inputs = prepare_inputs(&schema, inputs)?;

        info!(node = schema.id, session = %ctx.session, "Executing node");
        node.execute(ctx, inputs).await
    }
}

/// Fill defaults and check every declared input
fn prepare_inputs(schema: &NodeSchema, mut raw: NodeInputs) -> Result<NodeInputs> {
    let mut prepared = NodeInputs::new().for_node(schema.id);

    for spec in &schema.inputs {
        let value = match raw.remove(spec.name).or_else(|| spec.default.clone()) {
            Some(value) => value,
            None => {
                return Err(NodeError::MissingInput {
                    node: schema.id.to_string(),
                    input: spec.name.to_string(),
                })
            }
        };
        prepared.insert(spec.name, check_input(spec, value)?);
    }

    for extra in raw.names() {
        debug!(node = schema.id, input = extra, "Ignoring undeclared input");
    }
    Ok(prepared)
}

fn check_input(spec: &InputSpec, value: NodeValue) -> Result<NodeValue> {
    let found = value.port_type();
    let mismatch = || NodeError::TypeMismatch {
        input: spec.name.to_string(),
        expected: spec.port,
        found,
    };

    let value = match (spec.port, value) {
        (PortType::Any, value) => value,
        (PortType::Combo, NodeValue::String(choice)) => {
            if !spec.choices.contains(&choice.as_str()) {
                return Err(NodeError::InvalidChoice {
                    input: spec.name.to_string(),
                    value: choice,
                    choices: spec.choices.iter().map(|c| (*c).to_string()).collect(),
                });
            }
            NodeValue::String(choice)
        }
        // Widgets may send whole numbers as ints
        (PortType::Float, NodeValue::Int(v)) => NodeValue::Float(v as f64),
        (PortType::Int, NodeValue::Float(v)) if v.fract() == 0.0 => NodeValue::Int(v as i64),
        (expected, value) if expected == value.port_type() => value,
        _ => return Err(mismatch()),
    };

    if let (Some(range), Some(number)) = (spec.range, value.as_f64()) {
        if !range.contains(number) {
            return Err(NodeError::OutOfRange {
                input: spec.name.to_string(),
                value: number,
                min: range.min,
                max: range.max,
            });
        }
    }
    Ok(value)
}
