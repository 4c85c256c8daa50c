//! CLI error types.

use bm_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("{0}")]
    Server(String),
}
