//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to backend collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP transport failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Detail text from the response body, or the raw body.
        message: String,
    },

    /// The service is unreachable or refusing requests.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// A request URL could not be constructed.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns whether the failure happened without a service verdict,
    /// i.e. the caller must fail closed rather than trust prior state.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }
}
