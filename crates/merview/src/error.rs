//! CLI error types.

use merview_config::ConfigError;
use merview_dom::ParseError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid HTML: {0}")]
    Html(#[from] ParseError),

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Render(String),

    #[error("{0}")]
    Action(String),

    #[error("{0}")]
    Validation(String),
}
