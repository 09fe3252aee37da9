//! CLI error types.

use dox_config::ConfigError;
use dox_publish::PublishError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
