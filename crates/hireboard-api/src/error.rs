//! API error types.

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Client-facing variants display their message verbatim; it becomes the
/// `message` field of the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Too many requests, please slow down.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_) | ApiError::Store(_))
    }
}

/// Message shown in place of internal error details in production.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Response extension marking a body that carries internal error details.
#[derive(Debug, Clone, Copy)]
pub struct InternalErrorDetail;

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

fn error_body(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message,
        }),
    )
        .into_response()
}

/// Response for an internal error with its details withheld.
pub fn redacted_internal_response(status: StatusCode) -> Response {
    error_body(status, INTERNAL_ERROR_MESSAGE.to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let internal = self.is_internal();

        if internal {
            tracing::error!(error = %self, "Request failed with internal error");
        }

        let retry_after = match &self {
            ApiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = error_body(status, self.to_string());

        // Production redaction happens in `middleware::hide_internal_errors`
        if internal {
            response.extensions_mut().insert(InternalErrorDetail);
        }

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }

        response
    }
}
