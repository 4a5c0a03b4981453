//! Argument vector for a single ffmpeg run

use crate::filter::FilterGraph;
use bytes::Bytes;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// One ffmpeg command line plus an optional stdin payload
///
/// Every invocation starts with `-hide_banner -nostats` so stderr only holds
/// diagnostics and filter reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    label: String,
    args: Vec<OsString>,
    stdin: Option<Bytes>,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Invocation {
    pub fn new() -> Self {
        Self {
            label: "ffmpeg".to_string(),
            args: vec!["-hide_banner".into(), "-nostats".into()],
            stdin: None,
        }
    }

    /// Short name used in logs and error context
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// `-i <path>`
    #[must_use]
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.arg("-i").arg(path.as_ref())
    }

    /// `-af <graph>`, skipped when the graph is empty
    #[must_use]
    pub fn audio_filter(self, graph: &FilterGraph) -> Self {
        if graph.is_empty() {
            return self;
        }
        self.arg("-af").arg(graph.to_string())
    }

    /// Discard output through the null muxer (analysis passes)
    #[must_use]
    pub fn null_output(self) -> Self {
        self.args(["-f", "null", "-"])
    }

    /// Bytes written to ffmpeg's stdin, for `pipe:0` inputs
    #[must_use]
    pub fn with_stdin(mut self, data: Bytes) -> Self {
        self.stdin = Some(data);
        self
    }

    pub fn name(&self) -> &str {
        &self.label
    }

    pub fn argv(&self) -> &[OsString] {
        &self.args
    }

    pub fn stdin(&self) -> Option<&Bytes> {
        self.stdin.as_ref()
    }

    pub(crate) fn take_stdin(&mut self) -> Option<Bytes> {
        self.stdin.take()
    }

    /// Whether any argument equals `arg`
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following the first occurrence of `flag`
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    /// Filter graph passed with `-af`, if any
    pub fn audio_filter_text(&self) -> Option<String> {
        self.value_of("-af")
            .map(|graph| graph.to_string_lossy().into_owned())
    }

    /// Final positional argument when it names a file
    pub fn output_path(&self) -> Option<&Path> {
        let last = self.args.last()?;
        if last == "-" || last.to_string_lossy().starts_with('-') {
            return None;
        }
        Some(Path::new(last))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ffmpeg")?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
