//! Error types for the Remo client.

use thiserror::Error;

/// Errors that can occur when interacting with a Remo server.
#[derive(Error, Debug)]
pub enum RemoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Login rejected by the server, carries the response body
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// No token available, the request was not sent
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Referenced local file or directory does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Annotation set was fetched without the dataset it belongs to
    #[error("Annotation set {0} has no dataset id")]
    MissingDatasetId(i64),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// IO error while reading upload sources
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoError {
    /// Map a transport error, separating "could not connect" from other failures.
    ///
    /// Timeouts stay [`RemoError::Request`]: the server was reached.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() {
            RemoError::ServerUnreachable(e.to_string())
        } else {
            RemoError::Request(e)
        }
    }
}

/// Result type for Remo client operations.
pub type Result<T> = std::result::Result<T, RemoError>;
