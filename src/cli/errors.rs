//! CLI-specific error types
//!
//! Every CLI error ends the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::index::IndexError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Errors of the batch runner
#[derive(Debug, Error)]
pub enum CliError {
    // ==================
    // Configuration
    // ==================

    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid JSON for `RunConfig`
    #[error("Invalid config JSON: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// Configuration parsed but failed validation
    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    // ==================
    // Input / output
    // ==================

    /// File or stream I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed CSV input
    #[error("CSV error at line {line}: {message}")]
    Csv { line: usize, message: String },

    // ==================
    // Indexing
    // ==================

    /// The index catalog rejected an operation
    #[error("{0}")]
    Index(#[from] IndexError),
}

impl CliError {
    /// Validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        CliError::ConfigInvalid(message.into())
    }

    /// CSV format failure at a 1-based line
    pub fn csv(line: usize, message: impl Into<String>) -> Self {
        CliError::Csv {
            line,
            message: message.into(),
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::ConfigRead { .. } | CliError::ConfigParse(_) | CliError::ConfigInvalid(_) => {
                "MULTIRANGE_CLI_CONFIG_ERROR"
            }
            CliError::Io(_) => "MULTIRANGE_CLI_IO_ERROR",
            CliError::Json(_) => "MULTIRANGE_CLI_JSON_ERROR",
            CliError::Csv { .. } => "MULTIRANGE_CLI_CSV_ERROR",
            CliError::Index(e) => e.code().code(),
        }
    }

    /// Whether the error comes from the configuration file
    pub fn is_config_error(&self) -> bool {
        self.code() == "MULTIRANGE_CLI_CONFIG_ERROR"
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(1, |pos| pos.line() as usize);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => CliError::Io(source),
            csv::ErrorKind::UnequalLengths { expected_len, len, .. } => CliError::csv(
                line,
                format!("expected {} fields, found {}", expected_len, len),
            ),
            _ => CliError::csv(line, message),
        }
    }
}
