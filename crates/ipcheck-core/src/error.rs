use thiserror::Error;

/// Result type alias for ipcheck operations
pub type Result<T> = std::result::Result<T, IpCheckError>;

/// Errors that can occur while checking an IP or loading configuration
#[derive(Error, Debug)]
pub enum IpCheckError {
    /// Reputation API answered with a non-success status
    #[error("reputation API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Response body as returned by the API
        message: String,
    },

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IpCheckError {
    /// Returns the HTTP status code if the reputation API answered
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the error came from talking to the reputation API
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Http(_) | Self::Timeout(_) | Self::Json(_)
        )
    }
}
