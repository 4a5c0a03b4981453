//! Values flowing through node ports

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use xz_core::{AudioBuffer, ImageBatch, VideoFrames};

/// Port types known to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    Audio,
    Video,
    Image,
    String,
    Float,
    Int,
    Boolean,
    /// String restricted to a fixed list of choices
    Combo,
    Json,
    /// Accepts anything, used for ordering links
    #[serde(rename = "*")]
    Any,
}

impl PortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "AUDIO",
            Self::Video => "VIDEO",
            Self::Image => "IMAGE",
            Self::String => "STRING",
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::Boolean => "BOOLEAN",
            Self::Combo => "COMBO",
            Self::Json => "JSON",
            Self::Any => "*",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value on an input or output port
#[derive(Debug, Clone)]
pub enum NodeValue {
    Audio(AudioBuffer),
    Video(VideoFrames),
    Image(ImageBatch),
    String(String),
    Float(f64),
    Int(i64),
    Boolean(bool),
    Json(Value),
}

impl NodeValue {
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Audio(_) => PortType::Audio,
            Self::Video(_) => PortType::Video,
            Self::Image(_) => PortType::Image,
            Self::String(_) => PortType::String,
            Self::Float(_) => PortType::Float,
            Self::Int(_) => PortType::Int,
            Self::Boolean(_) => PortType::Boolean,
            Self::Json(_) => PortType::Json,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view, ints widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioBuffer> {
        match self {
            Self::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoFrames> {
        match self {
            Self::Video(video) => Some(video),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBatch> {
        match self {
            Self::Image(images) => Some(images),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// JSON form of scalar values (schema defaults, CLI output)
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::String(s) => Some(Value::from(s.as_str())),
            Self::Float(v) => Some(Value::from(*v)),
            Self::Int(v) => Some(Value::from(*v)),
            Self::Boolean(v) => Some(Value::from(*v)),
            Self::Json(v) => Some(v.clone()),
            Self::Audio(_) | Self::Video(_) | Self::Image(_) => None,
        }
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for NodeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for NodeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for NodeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<AudioBuffer> for NodeValue {
    fn from(value: AudioBuffer) -> Self {
        Self::Audio(value)
    }
}

impl From<VideoFrames> for NodeValue {
    fn from(value: VideoFrames) -> Self {
        Self::Video(value)
    }
}

impl From<ImageBatch> for NodeValue {
    fn from(value: ImageBatch) -> Self {
        Self::Image(value)
    }
}

impl From<Value> for NodeValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_widen_to_floats() {
        assert_eq!(NodeValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(NodeValue::Float(3.5).as_i64(), None);
    }

    #[test]
    fn media_values_have_no_json_form() {
        let audio = AudioBuffer::from_interleaved(vec![0.0; 4], 2, 48_000).unwrap();
        assert!(NodeValue::from(audio).to_json().is_none());
        assert_eq!(
            NodeValue::from("Audio").to_json(),
            Some(Value::from("Audio"))
        );
    }

    #[test]
    fn port_type_names_match_host() {
        assert_eq!(PortType::Audio.to_string(), "AUDIO");
        assert_eq!(PortType::Any.to_string(), "*");
        assert_eq!(NodeValue::Boolean(true).port_type(), PortType::Boolean);
    }

    #[test]
    fn serialized_names_match_display() {
        for port in [PortType::Audio, PortType::Image, PortType::Combo, PortType::Any] {
            assert_eq!(serde_json::to_value(port).unwrap(), Value::from(port.as_str()));
        }
        let wildcard: PortType = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(wildcard, PortType::Any);
    }
}
