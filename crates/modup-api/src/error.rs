//! API error types and conversions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use modup_core::UploadError;
use serde::{Deserialize, Serialize};

/// API error type that converts to HTTP responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 413 Payload Too Large
    PayloadTooLarge(String),
    /// 500 Internal Server Error
    Internal(String),
}

/// Error body shared by every failing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::MethodNotAllowed => "Method not allowed",
        }
    }

    /// Body for this error, after logging it at the matching level
    pub fn into_body(self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), message = self.message(), "API error");
        } else {
            tracing::debug!(
                status = status.as_u16(),
                message = self.message(),
                "API client error"
            );
        }

        let body = ErrorResponse {
            error: self.message().to_string(),
        };
        (status, body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_body();
        (status, Json(body)).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingUploadFields
            | UploadError::MissingFileId
            | UploadError::InvalidBody(_) => ApiError::BadRequest(err.to_string()),
            UploadError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
