//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication token required")]
    MissingToken,
    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,
    /// Bad signature, malformed token, wrong issuer, and expiry all land here
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("{0}")]
    ForbiddenRole(&'static str),
    #[error("Failed to issue token")]
    TokenIssueFailed,
    #[error("Failed to process password")]
    PasswordHashFailed,
    #[error("Failed to initialise signing key")]
    KeyInitFailed,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthorizationFormat
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::ForbiddenRole(_) => StatusCode::FORBIDDEN,
            AuthError::TokenIssueFailed
            | AuthError::PasswordHashFailed
            | AuthError::KeyInitFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidAuthorizationFormat => "INVALID_AUTHORIZATION",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ForbiddenRole(_) => "FORBIDDEN_ROLE",
            AuthError::TokenIssueFailed => "TOKEN_ISSUE_ERROR",
            AuthError::PasswordHashFailed => "PASSWORD_HASH_ERROR",
            AuthError::KeyInitFailed => "KEY_INIT_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Authentication infrastructure failure");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for carepoint_common::Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ForbiddenRole(message) => {
                carepoint_common::Error::Authorization(message.to_string())
            }
            other => carepoint_common::Error::Internal(other.to_string()),
        }
    }
}
