//! API error taxonomy.

use thiserror::Error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while talking to the heartbeat API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API rejected the credential (HTTP 401)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API rejected the request shape (HTTP 400)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The API rate limited the client (HTTP 429)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Server-side or network failure worth retrying later
    #[error("transient error: {0}")]
    Transient(String),

    /// The response body did not match the documented shape
    #[error("{message}. body: {body:?}")]
    Parse {
        /// What failed
        message: String,
        /// The raw response body, for diagnosis
        body: String,
    },

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Create a Parse error
    pub fn parse(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Whether the failed heartbeats should be re-queued and retried later.
    ///
    /// Rate limiting and transient failures also start the persisted backoff
    /// window; auth and bad-request failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Transient(_))
    }
}
