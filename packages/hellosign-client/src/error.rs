//! Error types for the HelloSign client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HelloSignError>;

#[derive(Debug, Error)]
pub enum HelloSignError {
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid or revoked API key (HTTP 401)
    #[error("HelloSign rejected the API key: {0}")]
    Unauthorized(String),

    /// Signature request or template does not exist (HTTP 404)
    #[error("HelloSign resource not found: {0}")]
    NotFound(String),

    #[error("HelloSign API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl HelloSignError {
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

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for HelloSignError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
