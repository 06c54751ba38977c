//! Error types and the uniform error response.
//!
//! Every failure while handling a request, whatever its kind, is answered
//! with `400 Bad Request` and a `{"reason": "..."}` body. The variants exist
//! for logging; clients only ever see the one shape.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;

use citytemp_weather::DateError;

use crate::auth::AuthError;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    InvalidDate(#[from] DateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InvalidDate(_) => "invalid_date",
            ApiError::Internal(_) => "internal",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let reason = self.to_string();
        tracing::warn!(kind = self.kind(), %reason, "Request failed");

        (StatusCode::BAD_REQUEST, Json(ErrorResponse { reason })).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

/// Turns a handler panic into the same response as any other failure.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!("Handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}
