/// Host configuration
use crate::error::{HostError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "xz-host.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default = "default_output")]
    pub output: OutputSettings,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: FfmpegSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Directory every save node writes under
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FfmpegSettings {
    /// Absolute path, or a bare name looked up on `PATH`
    #[serde(default = "default_ffmpeg_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Sessions whose workflow is kept at once
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            ffmpeg: default_ffmpeg(),
            cache: default_cache(),
        }
    }
}

impl HostConfig {
    /// Load from a TOML file, then `XZ_`-prefixed environment variables
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path).required(true)),
            None => settings
                .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        // e.g. XZ_OUTPUT_ROOT, XZ_FFMPEG_PATH, XZ_CACHE_CAPACITY
        settings = settings.add_source(
            config::Environment::with_prefix("XZ")
                .separator("_")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.output.root.is_dir() {
            return Err(HostError::Config(format!(
                "Output root {} is not a directory (set XZ_OUTPUT_ROOT)",
                self.output.root.display()
            )));
        }

        if self.ffmpeg.path.is_absolute() && !self.ffmpeg.path.is_file() {
            return Err(HostError::Config(format!(
                "FFmpeg not found at {}",
                self.ffmpeg.path.display()
            )));
        }

        if self.cache.capacity == 0 {
            return Err(HostError::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Absolute output root
    pub fn output_root(&self) -> Result<PathBuf> {
        self.output.root.canonicalize().map_err(|e| {
            HostError::Config(format!(
                "Cannot resolve output root {}: {}",
                self.output.root.display(),
                e
            ))
        })
    }
}

// Default values
fn default_output() -> OutputSettings {
    OutputSettings {
        root: default_output_root(),
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./output")
}

fn default_ffmpeg() -> FfmpegSettings {
    FfmpegSettings {
        path: default_ffmpeg_path(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        capacity: default_cache_capacity(),
    }
}

fn default_cache_capacity() -> usize {
    64
}
