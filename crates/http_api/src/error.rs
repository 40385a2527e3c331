//! API error types and their HTTP mapping

use aggregator::ContentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller sent bad parameters
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    /// Service-side failure; details stay in the logs
    #[error("service error: {0}")]
    Service(#[from] ContentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::Service(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            ApiError::Service(e) => {
                error!(error = %e, "http server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
