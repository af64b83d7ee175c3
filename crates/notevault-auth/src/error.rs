//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Token verification failure kinds
///
/// These never cross the gate boundary: the gate logs the kind and treats
/// the request as anonymous, so a client cannot distinguish why its token
/// was rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally invalid token or signature mismatch
    #[error("malformed token")]
    Malformed,

    /// Structurally valid but at or past its expiry
    #[error("expired token")]
    Expired,

    /// Decoding or charset error in the token payload
    #[error("unreadable token")]
    Unreadable,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                TokenError::Unreadable
            }
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password; deliberately indistinguishable
    #[error("Invalid credentials")]
    CredentialsInvalid,

    #[error("Account is locked")]
    AccountLocked,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Account has expired")]
    AccountExpired,

    #[error("Credentials have expired")]
    CredentialsExpired,

    #[error("Credential store unavailable")]
    LookupUnavailable,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("JWT secret must be at least {min} bytes, got {len}")]
    SecretTooShort { len: usize, min: usize },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::CredentialsInvalid => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::AccountLocked => (StatusCode::UNAUTHORIZED, "Account is locked"),
            AuthError::AccountDisabled => (StatusCode::UNAUTHORIZED, "Account is disabled"),
            AuthError::AccountExpired => (StatusCode::UNAUTHORIZED, "Account has expired"),
            AuthError::CredentialsExpired => {
                (StatusCode::UNAUTHORIZED, "Credentials have expired")
            }
            AuthError::LookupUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            AuthError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
            AuthError::SecretTooShort { .. }
            | AuthError::PasswordHash(_)
            | AuthError::Jwt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
