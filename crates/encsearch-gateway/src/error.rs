//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use encsearch_core::Error as CoreError;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed field/operator/mode/limit input.
    BadRequest(String),
    /// Record not found.
    NotFound(String),
    /// Concurrency limit reached within the bounded wait.
    Throttled,
    /// Backend call exceeded its timeout.
    Timeout(String),
    /// Any other backend failure.
    Backend(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Throttled => (
                StatusCode::TOO_MANY_REQUESTS,
                "THROTTLED",
                "concurrent request limit reached".to_string(),
            ),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg),
            AppError::Backend(msg) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR", msg),
        };

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound => AppError::NotFound("customer not found".to_string()),
            CoreError::Throttled => AppError::Throttled,
            CoreError::Timeout(_) => AppError::Timeout(err.to_string()),
            ref e if e.is_configuration() => AppError::BadRequest(err.to_string()),
            _ => AppError::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::time::Duration;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn configuration_errors_map_to_bad_request() {
        let err: AppError = CoreError::InvalidParameter {
            name: "field".to_string(),
            message: "unknown search field 'ssn'".to_string(),
        }
        .into();
        assert!(matches!(&err, AppError::BadRequest(_)));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        let err: AppError = CoreError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(status_of(err), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn backend_failures_map_to_bad_gateway() {
        let err: AppError = CoreError::Primary("connection refused".to_string()).into();
        assert!(matches!(&err, AppError::Backend(_)));
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn not_found_and_throttled_keep_their_statuses() {
        assert_eq!(status_of(CoreError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::Throttled.into()),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
