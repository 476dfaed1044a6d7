//! Error types for aide-api

use thiserror::Error;

/// Result type alias using aide-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling the external collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Collaborator returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an API error from a status code and body text
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from the transport layer rather than the
    /// collaborator's application logic.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let e = Error::api(500, "internal error");
        assert_eq!(e.to_string(), "API error (500): internal error");
    }

    #[test]
    fn test_api_error_not_transport() {
        assert!(!Error::api(503, "unavailable").is_transport());
        assert!(!Error::InvalidConfig("bad url".into()).is_transport());
    }
}
