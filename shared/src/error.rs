//! Error types for the trekking events Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving an events request.
#[derive(Error, Debug)]
pub enum Error {
    /// No verified caller identity on the request
    #[error("Authentication error: {0}")]
    Unauthenticated(String),

    /// Malformed or missing request body, or a missing path id
    #[error("{0}")]
    BadRequest(String),

    /// Caller is not the organizer of the event
    #[error("{0}")]
    Forbidden(String),

    /// No record for the requested id, or an unknown path
    #[error("{0}")]
    NotFound(String),

    /// Method is not supported on this path
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BadRequest(_) => 400,
            Error::Unauthenticated(_) => 401,
            Error::Forbidden(_) => 403,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed => 405,
            _ => 500,
        }
    }

    /// Message shown to the caller in the response body.
    ///
    /// Authentication failures never echo why the identity was rejected.
    pub fn public_message(&self) -> String {
        match self {
            Error::Unauthenticated(_) => "Unauthorized".to_string(),
            _ if self.status_code() == 500 => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
