/// Host error types
use thiserror::Error;
use xz_nodes::NodeError;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for HostError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
