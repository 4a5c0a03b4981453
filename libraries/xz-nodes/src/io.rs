//! Input and output maps for one execution

use crate::error::{NodeError, Result};
use crate::value::{NodeValue, PortType};
use std::collections::HashMap;
use xz_core::{AudioBuffer, ImageBatch, SavedFileDescriptor, VideoFrames};

/// Named input values
///
/// After [`NodeRegistry::execute`](crate::NodeRegistry::execute) has filled
/// defaults and checked types, the typed getters only fail on programming
/// errors inside a node.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    node: Option<&'static str>,
    values: HashMap<String, NodeValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<NodeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<NodeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values.get(name)
    }

    /// Tag the inputs with the node they belong to, for error messages
    pub(crate) fn for_node(mut self, node: &'static str) -> Self {
        self.node = Some(node);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<NodeValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        name: &str,
        expected: PortType,
        view: impl Fn(&'a NodeValue) -> Option<&'a T>,
    ) -> Result<&'a T> {
        let value = self.require(name)?;
        view(value).ok_or_else(|| NodeError::TypeMismatch {
            input: name.to_string(),
            expected,
            found: value.port_type(),
        })
    }

    fn require(&self, name: &str) -> Result<&NodeValue> {
        self.values.get(name).ok_or_else(|| NodeError::MissingInput {
            node: self.node.unwrap_or("node").to_string(),
            input: name.to_string(),
        })
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        self.typed(name, PortType::String, NodeValue::as_str)
    }

    pub fn audio(&self, name: &str) -> Result<&AudioBuffer> {
        self.typed(name, PortType::Audio, NodeValue::as_audio)
    }

    pub fn video(&self, name: &str) -> Result<&VideoFrames> {
        self.typed(name, PortType::Video, NodeValue::as_video)
    }

    pub fn image(&self, name: &str) -> Result<&ImageBatch> {
        self.typed(name, PortType::Image, NodeValue::as_image)
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| NodeError::TypeMismatch {
            input: name.to_string(),
            expected: PortType::Float,
            found: value.port_type(),
        })
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| NodeError::TypeMismatch {
            input: name.to_string(),
            expected: PortType::Int,
            found: value.port_type(),
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        let value = self.require(name)?;
        value.as_bool().ok_or_else(|| NodeError::TypeMismatch {
            input: name.to_string(),
            expected: PortType::Boolean,
            found: value.port_type(),
        })
    }
}

/// Ordered output values plus files for the host's preview panel
#[derive(Debug, Clone, Default)]
pub struct NodeOutputs {
    values: Vec<(&'static str, NodeValue)>,
    saved: Vec<SavedFileDescriptor>,
}

impl NodeOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<NodeValue>) -> Self {
        self.values.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_saved_file(mut self, file: SavedFileDescriptor) -> Self {
        self.saved.push(file);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn values(&self) -> &[(&'static str, NodeValue)] {
        &self.values
    }

    pub fn saved_files(&self) -> &[SavedFileDescriptor] {
        &self.saved
    }
}
