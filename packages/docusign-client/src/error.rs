//! Error types for the DocuSign client.

use thiserror::Error;

/// Result type for DocuSign client operations.
pub type Result<T> = std::result::Result<T, DocusignError>;

/// DocuSign client errors.
#[derive(Debug, Error)]
pub enum DocusignError {
    /// Configuration error (bad private key, missing account settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The access token was rejected (HTTP 401)
    #[error("DocuSign rejected the access token: {0}")]
    Unauthorized(String),

    /// The envelope or resource does not exist (HTTP 404)
    #[error("DocuSign resource not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response
    #[error("DocuSign API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Unexpected response body
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DocusignError {
    /// Map a non-success HTTP status and body to the matching variant.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized(body),
            404 => Self::NotFound(body),
            code => Self::Api {
                status: code,
                message: body,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for DocusignError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for DocusignError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Config(format!("JWT assertion: {}", e))
    }
}
