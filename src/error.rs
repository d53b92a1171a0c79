//! Custom error types for snapkeeper
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for snapkeeper operations
#[derive(Error, Debug)]
pub enum KeeperError {
    /// Invalid job definitions or config file contents
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line combinations
    #[error("{0}")]
    Argument(String),

    /// The date part captured from an archive name is not a date
    #[error("Cannot parse date '{value}' in archive '{archive}'")]
    NamingParse { archive: String, value: String },

    /// The archival backend exited unsuccessfully
    #[error("tarsnap failed with status {status}:\n{output}")]
    Backend { status: String, output: String },

    /// A job hook exited unsuccessfully
    #[error("'{command}' failed with exit code {status}")]
    Hook { command: String, status: String },

    /// Jobs requested on the command line that the config does not define
    #[error("not defined in the config file: {}", .0.join(", "))]
    UnknownJobs(Vec<String>),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// YAML parse errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl KeeperError {
    /// Create a backend error from an exit status and captured output
    pub fn backend(status: impl ToString, output: impl Into<String>) -> Self {
        Self::Backend {
            status: status.to_string(),
            output: output.into(),
        }
    }

    /// Check if this is a backend failure
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for KeeperError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for KeeperError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for snapkeeper operations
pub type KeeperResult<T> = Result<T, KeeperError>;
