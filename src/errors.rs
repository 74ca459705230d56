use thiserror::Error;

use crate::form::TransformError;

/// Failures surfaced by the orchestration core.
///
/// Invalid submissions, absent capabilities and running out of fields are not
/// errors; they are reported through outcome values instead.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("transform for field `{field}` failed: {source}")]
    Transform {
        field: String,
        #[source]
        source: TransformError,
    },
    #[error("every required field is valid; nothing to report")]
    NothingInvalid,
}

/// Error type raised while loading a form definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unknown transform `{transform}` referenced by field `{field}`")]
    UnknownTransform { field: String, transform: String },
}

/// Errors that end the terminal shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("{0}")]
    Usage(String),
}
