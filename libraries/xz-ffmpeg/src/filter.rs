//! Typed builder for ffmpeg filter graphs
//!
//! A graph is an ordered chain of stages. Each stage renders as
//! `name=key=value:key=value`, and stages are joined with `,`, which is the
//! syntax `-af` expects for a linear chain.

use std::fmt;

/// Characters that end an option value or a stage inside a filter graph
const SPECIAL_CHARS: [char; 7] = ['\\', '\'', ':', ',', ';', '[', ']'];

/// One filter in a chain, with parameters in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    name: String,
    params: Vec<(String, String)>,
}

impl FilterStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a `key=value` parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the first parameter with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '=' } else { ':' };
            write!(f, "{}{}={}", sep, key, escape_value(value))?;
        }
        Ok(())
    }
}

/// Linear chain of filter stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: FilterStage) {
        self.stages.push(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// First stage with the given filter name
    pub fn stage(&self, name: &str) -> Option<&FilterStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stage(name).is_some()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}

/// Quote a value that would otherwise break the graph syntax
fn escape_value(value: &str) -> String {
    if !value.contains(SPECIAL_CHARS) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_renders_in_insertion_order() {
        let stage = FilterStage::new("loudnorm")
            .param("I", -14.1)
            .param("TP", -1.1)
            .param("print_format", "json");

        assert_eq!(stage.to_string(), "loudnorm=I=-14.1:TP=-1.1:print_format=json");
        assert_eq!(stage.get("TP"), Some("-1.1"));
    }

    #[test]
    fn stage_without_params_is_just_the_name() {
        assert_eq!(FilterStage::new("anull").to_string(), "anull");
    }

    #[test]
    fn graph_joins_stages_with_commas() {
        let graph = FilterGraph::new()
            .with(FilterStage::new("acompressor").param("ratio", 3))
            .with(FilterStage::new("loudnorm").param("I", -16));

        assert_eq!(graph.to_string(), "acompressor=ratio=3,loudnorm=I=-16");
        assert!(graph.contains("loudnorm"));
        assert!(!graph.contains("alimiter"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn empty_graph_renders_empty() {
        assert_eq!(FilterGraph::new().to_string(), "");
        assert!(FilterGraph::new().is_empty());
    }

    #[test]
    fn special_characters_are_quoted() {
        let stage = FilterStage::new("drawtext").param("text", "a:b,c");
        assert_eq!(stage.to_string(), "drawtext=text='a:b,c'");

        let stage = FilterStage::new("drawtext").param("text", "it's");
        assert_eq!(stage.to_string(), "drawtext=text='it'\\''s'");
    }
}
