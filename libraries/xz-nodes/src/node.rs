/// The node trait every registered node implements
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::io::{NodeInputs, NodeOutputs};
use crate::schema::NodeSchema;
use async_trait::async_trait;

/// A node type the host can instantiate
///
/// `execute` receives inputs that already passed schema validation, with
/// defaults filled in.
#[async_trait]
pub trait Node: Send + Sync {
    fn schema(&self) -> NodeSchema;

    async fn execute(&self, ctx: &ExecutionContext, inputs: NodeInputs) -> Result<NodeOutputs>;
}
