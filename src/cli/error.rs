//! Error types for the CLI

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to parse {what}: {reason}")]
    ParseError { what: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to format output: {0}")]
    OutputError(String),

    /// The command ran but its result reports a failure
    #[error("{0}")]
    Failed(String),
}

impl CliError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            CliError::Config(err) => err.user_message(),
            CliError::ParseError { what, .. } => format!(
                "{self}\n\nHint: {what} must be JSON in the camelCase layout written by `sheetql extract`."
            ),
            CliError::InvalidArgument(_) => {
                format!("{self}\n\nHint: Run with --help to list the expected arguments.")
            }
            _ => self.to_string(),
        }
    }
}
