//! Error types for the gateway API server.
//!
//! [`GatewayError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Backend failures stay local: they map to `502`/`503` responses and
//! never tear down the live pipeline.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seismon_api::error::ApiError;

/// Errors that can occur in the gateway API layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid query parameter or request body was provided.
    #[error("invalid request: {0}")]
    InvalidQuery(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A backend request failed after the gateway forwarded it.
    #[error("backend request failed: {0}")]
    Upstream(#[from] ApiError),

    /// No analytics backend is configured for this deployment.
    #[error("no analytics backend configured")]
    NoBackend,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::InvalidQuery(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Self::NoBackend => (
                StatusCode::SERVICE_UNAVAILABLE,
                "no analytics backend configured".to_owned(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
