use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("version conflict on {0}")]
    VersionConflict(String),
    #[error("store rejected credentials: {0}")]
    AuthFailure(String),
    #[error("store denied access: {0}")]
    PermissionDenied(String),
    #[error("store call timed out after {0}s")]
    Timeout(u64),
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("malformed store response: {0}")]
    Malformed(String),
    #[error("unexpected store response: HTTP {status} - {body}")]
    Unexpected { status: u16, body: String },
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Timeouts and transient network failures may succeed if the user
    /// triggers the action again. Nothing else will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transient(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthFailure(_) | Self::PermissionDenied(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("{0} must be set for the github backend")]
    Missing(&'static str),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::VersionConflict(_) => StatusCode::CONFLICT,
            StoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            StoreError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::NotFound(_)
            | StoreError::AuthFailure(_)
            | StoreError::PermissionDenied(_)
            | StoreError::Malformed(_)
            | StoreError::Unexpected { .. } => StatusCode::BAD_GATEWAY,
            StoreError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classes() {
        assert!(StoreError::Timeout(20).is_retryable());
        assert!(StoreError::Transient("reset".into()).is_retryable());
        assert!(!StoreError::AuthFailure("bad token".into()).is_retryable());
        assert!(!StoreError::VersionConflict("p".into()).is_retryable());
        assert!(StoreError::PermissionDenied("scope".into()).is_auth());
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let conflict: AppError = StoreError::VersionConflict("p".into()).into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        let timeout: AppError = StoreError::Timeout(20).into();
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);
        let auth: AppError = StoreError::AuthFailure("x".into()).into();
        assert_eq!(auth.status, StatusCode::BAD_GATEWAY);
    }
}
