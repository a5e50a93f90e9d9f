//! Error type for backend API calls.
//!
//! Every variant is recoverable. The gateway maps these to HTTP error
//! responses for its own callers; the live stream pipeline never sees
//! them and keeps running on whatever data it already holds.

/// Errors from talking to the analytics backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request failed before a usable response arrived: connect
    /// failure, timeout, or an unreadable body.
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status of the response.
        status: reqwest::StatusCode,
        /// Response body, when it could be read.
        body: String,
    },

    /// The response was valid JSON but not a shape this client knows.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// The response JSON did not decode into the target type.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
