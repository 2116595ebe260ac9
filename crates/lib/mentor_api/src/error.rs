//! Application error types.

use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mentor_core::ChatError;
use thiserror::Error;

use crate::models::{ErrorResponse, timestamp_now};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
///
/// Every variant except `Validation` carries optional internal detail that
/// is only rendered when the server exposes error details.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid API configuration")]
    Unauthorized(Option<String>),

    #[error("Request timed out")]
    Timeout(Option<String>),

    #[error("API quota exceeded")]
    QuotaExceeded(Option<String>),

    #[error("Failed to initialize AI model")]
    ModelInit(Option<String>),

    #[error("Failed to process chat message")]
    Upstream(Option<String>),

    #[error("Internal server error")]
    Internal(Option<String>),
}

impl AppError {
    /// Translate a relay error, keeping the internal message only when
    /// `expose_details` is set.
    pub fn from_chat(err: ChatError, expose_details: bool) -> Self {
        let detail = expose_details.then(|| err.to_string());
        match err {
            ChatError::Validation(m) => AppError::Validation(m),
            ChatError::ModelInit(_) => AppError::ModelInit(detail),
            ChatError::Timeout(_) => AppError::Timeout(detail),
            ChatError::Auth(_) => AppError::Unauthorized(detail),
            ChatError::QuotaExceeded(_) => AppError::QuotaExceeded(detail),
            ChatError::Upstream(_) => AppError::Upstream(detail),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ModelInit(_) | AppError::Upstream(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match self {
            AppError::Validation(m) => (m, None),
            AppError::Unauthorized(d) => ("Invalid API configuration".to_string(), d),
            AppError::Timeout(d) => ("Request timed out. Please try again.".to_string(), d),
            AppError::QuotaExceeded(d) => {
                ("API quota exceeded. Please try again later.".to_string(), d)
            }
            AppError::ModelInit(d) => ("Failed to initialize AI model".to_string(), d),
            AppError::Upstream(d) => ("Failed to process chat message".to_string(), d),
            AppError::Internal(d) => ("Internal server error".to_string(), d),
        };
        let body = Json(ErrorResponse {
            error,
            details,
            success: false,
            timestamp: timestamp_now(),
        });
        (status, body).into_response()
    }
}

/// Malformed bodies, wrong field types and missing content types are all
/// client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn chat_errors_map_to_documented_statuses() {
        let cases = [
            (ChatError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ChatError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (ChatError::Timeout(Duration::from_secs(30)), StatusCode::REQUEST_TIMEOUT),
            (ChatError::QuotaExceeded("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (ChatError::ModelInit("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ChatError::Upstream("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from_chat(err, false).status(), status);
        }
    }

    #[test]
    fn details_follow_expose_flag() {
        let hidden = AppError::from_chat(ChatError::Upstream("secret internals".into()), false);
        assert!(matches!(hidden, AppError::Upstream(None)));

        let shown = AppError::from_chat(ChatError::Upstream("secret internals".into()), true);
        match shown {
            AppError::Upstream(Some(d)) => assert!(d.contains("secret internals")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validation_message_is_always_public() {
        let err = AppError::from_chat(ChatError::Validation("Message cannot be empty".into()), false);
        assert!(matches!(err, AppError::Validation(ref m) if m == "Message cannot be empty"));
    }
}
