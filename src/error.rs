use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Request-level error taxonomy. Every fallible operation in the service
/// layer resolves to exactly one of these kinds; the HTTP mapping lives in
/// [`IntoResponse`] below.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller input malformed or missing. Never retried.
    #[error("{0}")]
    Validation(String),
    /// Uniqueness or duplicate-favorite violation. Never retried.
    #[error("{0}")]
    Conflict(String),
    /// Bad credentials. The message is intentionally generic so unknown-email
    /// and wrong-password are indistinguishable to the caller.
    #[error("Invalid credentials, could not sign in.")]
    Unauthorized,
    /// Missing entity.
    #[error("{0}")]
    NotFound(String),
    /// Backend I/O error. Safe for the caller to retry.
    #[error("storage backend error")]
    Storage(#[from] sqlx::Error),
    /// Hash/verify primitive error. Safe to retry.
    #[error("password hashing error")]
    Crypto(String),
    /// Token signing error. Safe to retry.
    #[error("token signing error")]
    Token(#[from] jsonwebtoken::errors::Error),
    /// Uploaded-file store error. Safe to retry.
    #[error("file storage error")]
    Files(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Crypto(_) | Self::Token(_) | Self::Files(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message serialized to the client. Internal kinds never leak the
    /// underlying engine detail.
    fn public_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Crypto(_) | Self::Token(_) | Self::Files(_) => {
                "Something went wrong, please try again later.".into()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_stable() {
        assert_eq!(
            AppError::validation("bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::conflict("dup").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::not_found("gone").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Crypto("argon2".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Storage(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::Storage(sqlx::Error::PoolTimedOut);
        assert!(!err.public_message().contains("pool"));

        let err = AppError::Crypto("argon2 parse hash error".into());
        assert!(!err.public_message().contains("argon2"));
    }

    #[test]
    fn unauthorized_message_is_generic() {
        assert_eq!(
            AppError::Unauthorized.public_message(),
            "Invalid credentials, could not sign in."
        );
    }
}
