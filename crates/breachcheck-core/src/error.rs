//! Error types for BreachCheck.
//!
//! Every variant carries a message that can be shown to the user as-is; the
//! CLI prints `Display` output without further decoration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the BreachCheck library.
#[derive(Debug, Error)]
pub enum BreachError {
    // Caller errors
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    // Availability errors
    #[error("{resource} is unavailable: {reason}")]
    ResourceUnavailable { resource: String, reason: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Install of cache generation {version} failed for {} asset(s): {}", .failed.len(), .failed.join(", "))]
    InstallFailure { version: String, failed: Vec<String> },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("{message}")]
    Api { status: u16, message: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for BreachCheck operations.
pub type Result<T> = std::result::Result<T, BreachError>;

impl From<std::io::Error> for BreachError {
    fn from(err: std::io::Error) -> Self {
        BreachError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BreachError {
    fn from(err: serde_json::Error) -> Self {
        BreachError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for BreachError {
    fn from(err: rusqlite::Error) -> Self {
        BreachError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for BreachError {
    fn from(err: reqwest::Error) -> Self {
        let cause = std::error::Error::source(&err).map(|s| s.to_string());
        BreachError::Network {
            message: err.to_string(),
            cause,
        }
    }
}

impl BreachError {
    /// Shorthand for an [`BreachError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        BreachError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`BreachError::MalformedResponse`].
    pub fn malformed(message: impl Into<String>) -> Self {
        BreachError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Shorthand for a [`BreachError::ResourceUnavailable`].
    pub fn unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        BreachError::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Lock poisoning on a store mutex.
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        BreachError::Database {
            message: format!("Failed to lock {}", what),
            source: None,
        }
    }

    /// Whether the error came from getting a response at all (transport,
    /// status or body) rather than from the caller or local storage.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BreachError::Network { .. }
                | BreachError::Api { .. }
                | BreachError::MalformedResponse { .. }
                | BreachError::Json { .. }
                | BreachError::ResourceUnavailable { .. }
        )
    }

    /// HTTP status for the local proxy when this error ends a request.
    pub fn http_status(&self) -> u16 {
        match self {
            BreachError::InvalidInput { .. } => 400,
            BreachError::Api { status, .. } => *status,
            BreachError::ResourceUnavailable { .. } | BreachError::Network { .. } => 504,
            BreachError::MalformedResponse { .. } | BreachError::Json { .. } => 502,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BreachError::invalid_input("password", "must not be empty");
        assert_eq!(err.to_string(), "Invalid password: must not be empty");

        let err = BreachError::Api {
            status: 404,
            message: "Breach not found".into(),
        };
        assert_eq!(err.to_string(), "Breach not found");
    }

    #[test]
    fn test_install_failure_lists_assets() {
        let err = BreachError::InstallFailure {
            version: "bc-v3".into(),
            failed: vec!["index.html".into(), "assets/js/ui.js".into()],
        };
        assert_eq!(
            err.to_string(),
            "Install of cache generation bc-v3 failed for 2 asset(s): index.html, assets/js/ui.js"
        );
    }

    #[test]
    fn test_transport_classification() {
        assert!(BreachError::Network {
            message: "connection refused".into(),
            cause: None
        }
        .is_transport());
        assert!(BreachError::malformed("bad line").is_transport());
        assert!(!BreachError::invalid_input("password", "empty").is_transport());
        assert!(!BreachError::Config {
            message: "bad url".into()
        }
        .is_transport());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(BreachError::unavailable("/index.html", "offline").http_status(), 504);
        assert_eq!(BreachError::invalid_input("target", "empty").http_status(), 400);
        assert_eq!(
            BreachError::Api {
                status: 429,
                message: "slow down".into()
            }
            .http_status(),
            429
        );
    }
}
