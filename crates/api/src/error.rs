//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, ErrorKind};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No usable caller identity on the request.
    Unauthorized(String),
    /// Malformed request from the client.
    BadRequest(String),
    /// Failure reported by the checkout services.
    Checkout(CheckoutError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::BadRequest(_) => ErrorKind::ValidationFailure,
            ApiError::Checkout(err) => err.kind(),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InsufficientStock => StatusCode::CONFLICT,
        ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorKind::TransactionFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        metrics::counter!("api_errors_total", "kind" => kind.as_str()).increment(1);
        let message = match self {
            ApiError::Unauthorized(msg) | ApiError::BadRequest(msg) => msg,
            ApiError::Checkout(CheckoutError::Transaction(err)) => {
                tracing::error!(error = %err, "storage failure");
                "The request could not be completed, please retry".to_string()
            }
            ApiError::Checkout(err) => err.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail { kind, message },
        };
        (status_for(kind), axum::Json(body)).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
