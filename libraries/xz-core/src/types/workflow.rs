/// Workflow metadata injected by the host
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hidden workflow context that save nodes embed in their output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// The executed prompt graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Value>,
    /// The editor workflow (node layout, links, widgets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Value>,
}

impl WorkflowMetadata {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.workflow.is_none()
    }

    /// Key/value pairs for container metadata tags
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = Vec::new();
        if let Some(prompt) = &self.prompt {
            tags.push(("prompt", prompt.to_string()));
        }
        if let Some(workflow) = &self.workflow {
            tags.push(("workflow", workflow.to_string()));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_skip_missing_values() {
        let metadata = WorkflowMetadata {
            prompt: Some(json!({"1": {"class_type": "XAudioSave"}})),
            workflow: None,
        };
        let tags = metadata.tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].0, "prompt");
        assert!(tags[0].1.contains("XAudioSave"));
    }

    #[test]
    fn empty_metadata_serializes_to_empty_object() {
        let metadata = WorkflowMetadata::default();
        assert!(metadata.is_empty());
        assert_eq!(serde_json::to_string(&metadata).unwrap(), "{}");
    }
}
