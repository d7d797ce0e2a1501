//! Crate-level error types.
//!
//! [`BlyvError`] unifies every error source (configuration, terminal I/O,
//! HTTP, JSON) behind a single enum so callers can match on the variant they
//! care about while still using the `?` operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BlyvError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum BlyvError {
    /// An environment variable was missing or could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal setup, teardown, or drawing failed.
    #[error("io error: {0}")]
    Io(String),

    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The upstream answered, but not with the data we asked for.
    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream answered with a body we could not make sense of.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BlyvError {
    /// Classifies a reqwest failure that happened before a status was read.
    pub(crate) fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BlyvError::Network(format!("{context}: request timed out"))
        } else {
            BlyvError::Network(format!("{context}: {err}"))
        }
    }
}
