//! Unified error type for the directory client.
//!
//! Every fallible operation in the crate returns [`Result`]. Backend failures keep the
//! HTTP status and the message the backend sent so pages can show them in an error panel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} row not found: {id}")]
    NotFound { table: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {message}")]
    Auth { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the query layer should try the request again.
    ///
    /// Missing rows and local validation/config failures are deterministic, everything
    /// coming back from the wire is retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::NotFound { .. } | Self::Validation { .. } | Self::Config { .. } | Self::Auth { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let server = Error::Backend {
            status: 503,
            message: "unavailable".to_string(),
        };
        let policy = Error::Backend {
            status: 401,
            message: "JWT expired".to_string(),
        };
        let missing = Error::NotFound {
            table: "events".to_string(),
            id: "abc".to_string(),
        };

        assert!(server.is_retryable());
        assert!(policy.is_retryable());
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_display_includes_status() {
        let err = Error::Backend {
            status: 404,
            message: "relation does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend error (404): relation does not exist"
        );
    }
}
