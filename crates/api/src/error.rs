//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
///
/// Every error body has the shape `{"error": <message>, "kind": <category>}`.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Request body is not valid JSON for the endpoint.
    InvalidJson(String),
    /// Saga execution error.
    Saga(SagaError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "invalid_json"),
            ApiError::Saga(err) => (saga_status(err), err.kind()),
        }
    }
}

fn saga_status(err: &SagaError) -> StatusCode {
    match err {
        SagaError::Validation(_)
        | SagaError::InvalidUser { .. }
        | SagaError::InvalidStatus { .. }
        | SagaError::AmountOutOfRange { .. } => StatusCode::BAD_REQUEST,
        SagaError::ProductNotFound { .. } | SagaError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        SagaError::InsufficientStock { .. } | SagaError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        SagaError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SagaError::Persistence(_) | SagaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.parts();
        let message = match self {
            ApiError::NotFound(msg) | ApiError::InvalidJson(msg) => msg,
            ApiError::Saga(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, kind, "request failed");
        }

        let body = serde_json::json!({ "error": message, "kind": kind });
        (status, axum::Json(body)).into_response()
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}
