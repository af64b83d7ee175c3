//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] notevault_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] notevault_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Auth errors carry their own status mapping and client message
        let err = match self {
            ApiError::Auth(e) => return e.into_response(),
            other => other,
        };

        let (status, message) = match &err {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Database(e) => match e {
                notevault_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                notevault_db::DbError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                ),
            },
            ApiError::Auth(_) => unreachable!(),
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
