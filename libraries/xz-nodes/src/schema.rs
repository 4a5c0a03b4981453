//! Node schemas: what a node accepts and produces

use crate::value::{NodeValue, PortType};
use serde::{Serialize, Serializer};

/// Inclusive numeric bounds with a UI step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// One input port
#[derive(Debug, Clone, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub port: PortType,
    #[serde(serialize_with = "serialize_default", skip_serializing_if = "Option::is_none")]
    pub default: Option<NodeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
    pub tooltip: &'static str,
}

impl InputSpec {
    fn new(name: &'static str, port: PortType) -> Self {
        Self {
            name,
            port,
            default: None,
            range: None,
            choices: Vec::new(),
            tooltip: "",
        }
    }

    pub fn audio(name: &'static str) -> Self {
        Self::new(name, PortType::Audio)
    }

    pub fn video(name: &'static str) -> Self {
        Self::new(name, PortType::Video)
    }

    pub fn image(name: &'static str) -> Self {
        Self::new(name, PortType::Image)
    }

    pub fn any(name: &'static str) -> Self {
        Self::new(name, PortType::Any)
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self {
            default: Some(NodeValue::from(default)),
            ..Self::new(name, PortType::String)
        }
    }

    pub fn boolean(name: &'static str, default: bool) -> Self {
        Self {
            default: Some(NodeValue::Boolean(default)),
            ..Self::new(name, PortType::Boolean)
        }
    }

    pub fn float(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            default: Some(NodeValue::Float(default)),
            range: Some(NumericRange { min, max, step }),
            ..Self::new(name, PortType::Float)
        }
    }

    pub fn int(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            default: Some(NodeValue::Int(default)),
            range: Some(NumericRange {
                min: min as f64,
                max: max as f64,
                step: 1.0,
            }),
            ..Self::new(name, PortType::Int)
        }
    }

    pub fn combo(name: &'static str, choices: &[&'static str], default: &'static str) -> Self {
        Self {
            default: Some(NodeValue::from(default)),
            choices: choices.to_vec(),
            ..Self::new(name, PortType::Combo)
        }
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: &'static str) -> Self {
        self.tooltip = tooltip;
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// One output port
#[derive(Debug, Clone, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub port: PortType,
    pub tooltip: &'static str,
}

impl OutputSpec {
    pub fn new(name: &'static str, port: PortType, tooltip: &'static str) -> Self {
        Self {
            name,
            port,
            tooltip,
        }
    }
}

/// Full description of a node type
#[derive(Debug, Clone, Serialize)]
pub struct NodeSchema {
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    /// Output nodes are always executed by the host
    pub output_node: bool,
}

impl NodeSchema {
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.name == name)
    }
}

fn serialize_default<S: Serializer>(
    value: &Option<NodeValue>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    value
        .as_ref()
        .and_then(NodeValue::to_json)
        .serialize(serializer)
}
