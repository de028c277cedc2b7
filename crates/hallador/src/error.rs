//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Values file could not be read
    #[error("Invalid values file: {message}")]
    Values {
        /// Error message
        message: String,
    },

    /// A fatal field stopped the fill
    #[error("Fill aborted at '{field}': {message}")]
    Aborted {
        /// Field that failed
        field: String,
        /// Failure message
        message: String,
    },

    /// Browser could not be driven
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hallar library error
    #[error("Hallar error: {0}")]
    Hallar(#[from] hallar::HallarError),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a values file error
    #[must_use]
    pub fn values(message: impl Into<String>) -> Self {
        Self::Values {
            message: message.into(),
        }
    }

    /// Create an aborted-fill error
    #[must_use]
    pub fn aborted(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Aborted {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a browser error
    #[must_use]
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }
}
