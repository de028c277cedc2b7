//! Result and error types for Hallar.
//!
//! Two families of failure exist. Recoverable ones (`CandidateTimeout`,
//! `Driver`) are absorbed by the resolver and only advance the fallback
//! chain. Structural ones are surfaced to the caller with the field name and
//! the strategies that were attempted.

use thiserror::Error;

/// Result type for Hallar operations
pub type HallarResult<T> = Result<T, HallarError>;

/// Errors that can occur while resolving or operating on a field
#[derive(Debug, Error)]
pub enum HallarError {
    /// Element never became actionable within the candidate's bound
    #[error("Candidate `{selector}` for field '{field}' timed out after {ms}ms")]
    CandidateTimeout {
        /// Logical field name
        field: String,
        /// Selector that was waited on
        selector: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Every candidate was attempted and none matched
    #[error("No candidate matched field '{field}'; tried: [{tried}]", tried = .attempted.join(", "))]
    NoMatchingCandidate {
        /// Logical field name
        field: String,
        /// Every selector attempted, in order
        attempted: Vec<String>,
    },

    /// No hidden native select exposed an option matching the field
    #[error(
        "No hidden control for field '{field}' matched any of [{expected}] ({inspected} inspected)",
        expected = .matchers.join(", ")
    )]
    AmbiguousHiddenControl {
        /// Logical field name
        field: String,
        /// Expected option substrings
        matchers: Vec<String>,
        /// Number of hidden controls inspected
        inspected: usize,
    },

    /// Field descriptor or catalog is unusable as declared
    #[error("Configuration error for field '{field}': {message}")]
    ConfigurationError {
        /// Logical field name (empty for catalog-level problems)
        field: String,
        /// Error message
        message: String,
    },

    /// The resolved control could not be driven to the requested value
    #[error("Could not set field '{field}' to '{value}': {reason}")]
    ActionFailed {
        /// Logical field name
        field: String,
        /// Value the caller asked for
        value: String,
        /// What went wrong
        reason: String,
    },

    /// Page-automation driver error (stale element, protocol error, ...)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Field catalog could not be parsed
    #[error("Failed to parse field catalog: {message}")]
    CatalogParse {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HallarError {
    /// Create a configuration error for a field
    #[must_use]
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an action failure
    #[must_use]
    pub fn action(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ActionFailed {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether the resolver recovers from this error locally by advancing
    /// to the next candidate
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::CandidateTimeout { .. } | Self::Driver { .. })
    }

    /// Name of the field the error refers to, if any
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::CandidateTimeout { field, .. }
            | Self::NoMatchingCandidate { field, .. }
            | Self::AmbiguousHiddenControl { field, .. }
            | Self::ConfigurationError { field, .. }
            | Self::ActionFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_candidate_lists_attempts() {
        let err = HallarError::NoMatchingCandidate {
            field: "Giá bán".to_string(),
            attempted: vec![
                "input[name=\"price_in_vnd\"]".to_string(),
                "input[placeholder=\"Nhập giá bán\"]".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Giá bán"));
        assert!(msg.contains("price_in_vnd"));
        assert!(msg.contains("Nhập giá bán"));
    }

    #[test]
    fn test_ambiguous_hidden_control_message() {
        let err = HallarError::AmbiguousHiddenControl {
            field: "Nội thất".to_string(),
            matchers: vec!["thất".to_string(), "furniture".to_string()],
            inspected: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("furniture"));
        assert!(msg.contains("4 inspected"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(HallarError::driver("stale element").is_recoverable());
        assert!(HallarError::CandidateTimeout {
            field: "a".into(),
            selector: "b".into(),
            ms: 10,
        }
        .is_recoverable());
        assert!(!HallarError::config("a", "empty").is_recoverable());
        assert!(!HallarError::action("a", "b", "c").is_recoverable());
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(HallarError::config("Dự án", "x").field(), Some("Dự án"));
        assert_eq!(HallarError::driver("x").field(), None);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HallarError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
