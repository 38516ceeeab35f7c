//! Error types for convhub

use thiserror::Error;

/// Main error type for convhub operations
#[derive(Debug, Error)]
pub enum ConvHubError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Error reported by the proxy or the provider behind it.
    ///
    /// Displays only the message so it can be shown to the user as-is.
    #[error("{message}")]
    Api {
        /// HTTP status returned by the server
        status: u16,
        /// Server-provided (or synthesized) message
        message: String,
    },

    /// Document extraction error
    #[error("Document error: {0}")]
    Document(String),
}

/// Convenient Result type using ConvHubError
pub type Result<T> = std::result::Result<T, ConvHubError>;

impl ConvHubError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        ConvHubError::Config(msg.into())
    }

    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        ConvHubError::Template(msg.into())
    }

    /// Create an API error
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        ConvHubError::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create a document error
    pub fn document(msg: impl Into<String>) -> Self {
        ConvHubError::Document(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_only() {
        let err = ConvHubError::api(502, "Error from external LLM API.");
        assert_eq!(err.to_string(), "Error from external LLM API.");
        assert!(matches!(err, ConvHubError::Api { status: 502, .. }));
    }

    #[test]
    fn test_error_helpers() {
        assert_eq!(
            ConvHubError::config("bad port").to_string(),
            "Configuration error: bad port"
        );
        assert_eq!(
            ConvHubError::document("zip").to_string(),
            "Document error: zip"
        );
    }
}
