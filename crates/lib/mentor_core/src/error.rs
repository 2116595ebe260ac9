//! Relay error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::model::UpstreamError;

/// Errors surfaced by [`crate::relay::ChatRelay`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to initialize model: {0}")]
    ModelInit(String),

    #[error("Upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Upstream rejected credentials: {0}")]
    Auth(String),

    #[error("Upstream quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

const AUTH_MARKERS: &[&str] = &[
    "api key",
    "api_key",
    "permission",
    "unauthenticated",
    "unauthorized",
    "credential",
];

const QUOTA_MARKERS: &[&str] = &["quota", "rate limit", "resource_exhausted", "resource exhausted"];

impl ChatError {
    /// Classify a failed send by status code first, then by message content.
    pub fn from_upstream(err: UpstreamError, deadline: Duration) -> Self {
        match err {
            UpstreamError::Timeout => ChatError::Timeout(deadline),
            UpstreamError::Status { code, message } => match code {
                401 | 403 => ChatError::Auth(message),
                429 => ChatError::QuotaExceeded(message),
                _ => Self::classify_message(message),
            },
            other => Self::classify_message(other.to_string()),
        }
    }

    fn classify_message(message: String) -> Self {
        let lower = message.to_lowercase();
        if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
            ChatError::Auth(message)
        } else if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
            ChatError::QuotaExceeded(message)
        } else {
            ChatError::Upstream(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADLINE: Duration = Duration::from_secs(30);

    fn status(code: u16, message: &str) -> UpstreamError {
        UpstreamError::Status {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn auth_status_codes_map_to_auth() {
        assert!(matches!(
            ChatError::from_upstream(status(401, "nope"), DEADLINE),
            ChatError::Auth(_)
        ));
        assert!(matches!(
            ChatError::from_upstream(status(403, "nope"), DEADLINE),
            ChatError::Auth(_)
        ));
    }

    #[test]
    fn invalid_key_reported_as_bad_request_is_auth() {
        let err = status(400, "API key not valid. Please pass a valid API key.");
        assert!(matches!(ChatError::from_upstream(err, DEADLINE), ChatError::Auth(_)));
    }

    #[test]
    fn too_many_requests_is_quota() {
        assert!(matches!(
            ChatError::from_upstream(status(429, "slow down"), DEADLINE),
            ChatError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn quota_in_message_is_quota() {
        let err = UpstreamError::Transport("Quota exceeded for metric".into());
        assert!(matches!(
            ChatError::from_upstream(err, DEADLINE),
            ChatError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn client_timeout_is_timeout() {
        assert!(matches!(
            ChatError::from_upstream(UpstreamError::Timeout, DEADLINE),
            ChatError::Timeout(d) if d == DEADLINE
        ));
    }

    #[test]
    fn anything_else_is_generic_upstream() {
        assert!(matches!(
            ChatError::from_upstream(status(500, "internal"), DEADLINE),
            ChatError::Upstream(_)
        ));
        assert!(matches!(
            ChatError::from_upstream(UpstreamError::EmptyResponse, DEADLINE),
            ChatError::Upstream(_)
        ));
    }
}
