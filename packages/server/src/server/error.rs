//! HTTP mapping for core errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::Error;

/// Error body: `{"error": "<message>", "code": "<machine code>"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::IllegalTransition { .. } | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InvalidRole(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Store and internal details stay in the logs
            Error::StoreUnavailable(detail) => {
                error!(code = self.code(), detail = %detail, "Request failed");
                "Service temporarily unavailable".to_string()
            }
            Error::Internal(detail) => {
                error!(code = self.code(), detail = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code: self.code(),
            }),
        )
            .into_response()
    }
}
