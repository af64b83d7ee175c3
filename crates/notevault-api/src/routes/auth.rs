//! Login and token-inspection routes

use axum::{extract::State, routing::post, Json, Router};
use notevault_auth::{check_account_status, password, verify_password, AuthError, Claims};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{IntrospectRequest, LoginRequest, LoginResponse};

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /api/auth/public/signin
///
/// The only place cleartext passwords are handled, and only for the duration
/// of the hash comparison. Unknown usernames and wrong passwords are
/// deliberately indistinguishable to the caller; account-status failures
/// each surface their own reason.
async fn signin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Validate input lengths to prevent DoS
    validate_username(&request.username)?;
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    debug!("Login attempt for user: {}", request.username);

    let user_result = state
        .db
        .get_user_by_username(&request.username)
        .await
        .map_err(|e| {
            warn!(error = %e, "credential lookup failed");
            AuthError::LookupUnavailable
        })?;

    // Verify a password hash even when the user doesn't exist, so a lookup
    // miss costs the same as a mismatch and usernames cannot be enumerated
    // by timing.
    let (hash_to_verify, user) = match user_result {
        Some(u) => (u.password_hash.clone(), Some(u)),
        None => (password::DUMMY_HASH.to_string(), None),
    };

    let password_valid = verify_password(&request.password, &hash_to_verify)?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => return Err(AuthError::CredentialsInvalid.into()),
    };

    // Correct password is not enough: a disabled, locked, or expired account
    // never authenticates, and the caller is told which it was.
    check_account_status(&user)?;

    let token = state.codec.issue(&user)?;

    info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.codec.lifetime_ms() / 1000,
    }))
}

/// POST /api/auth/public/introspect
///
/// Decodes a caller-held token and returns its claims. Never used to
/// establish trust; the response does not reveal why an unusable token
/// failed.
async fn introspect(
    State(state): State<AppState>,
    Json(request): Json<IntrospectRequest>,
) -> Result<Json<Claims>, ApiError> {
    let claims = state.codec.verify(&request.token).map_err(|kind| {
        debug!(error = %kind, "introspection of unusable token");
        ApiError::BadRequest("Invalid token".to_string())
    })?;

    Ok(Json(claims))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/public/signin", post(signin))
        .route("/api/auth/public/introspect", post(introspect))
}
