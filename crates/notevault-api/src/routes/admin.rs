//! Administrative account-management routes
//!
//! These are the only operations that mutate an account's roles, lock
//! state, or expiry dates. The whole prefix is gated on the administrative
//! role by the route access policy; handlers trust the policy layer.

use std::collections::BTreeSet;
use std::str::FromStr;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use notevault_db::{ExpiryUpdate, Role};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ExpiryRequest, LockRequest, UpdateRolesRequest, UserResponse};

async fn load_user(state: &AppState, id: i64) -> Result<notevault_db::User, ApiError> {
    state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))
}

/// GET /api/admin/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/admin/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = load_user(&state, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/admin/users/{id}/role
async fn update_roles(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRolesRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let roles = request
        .roles
        .iter()
        .map(|r| Role::from_str(r))
        .collect::<Result<BTreeSet<_>, _>>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if roles.is_empty() {
        return Err(ApiError::BadRequest(
            "Role set must not be empty".to_string(),
        ));
    }

    let user = load_user(&state, id).await?;
    state.db.update_user_roles(id, &roles).await?;

    info!("Updated roles for user: {}", user.username);

    let user = load_user(&state, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/admin/users/{id}/lock
async fn set_lock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<LockRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = load_user(&state, id).await?;
    state.db.set_account_lock(id, request.locked).await?;

    info!(
        "{} account: {}",
        if request.locked { "Locked" } else { "Unlocked" },
        user.username
    );

    let user = load_user(&state, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/admin/users/{id}/expiry
async fn update_expiry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ExpiryRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if request.account_expiry_date.is_none() && request.credentials_expiry_date.is_none() {
        return Err(ApiError::BadRequest(
            "At least one expiry date is required".to_string(),
        ));
    }

    let user = load_user(&state, id).await?;
    state
        .db
        .update_user_expiry(
            id,
            ExpiryUpdate {
                account_expiry_date: request.account_expiry_date,
                credentials_expiry_date: request.credentials_expiry_date,
            },
        )
        .await?;

    info!("Updated expiry dates for user: {}", user.username);

    let user = load_user(&state, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Create admin routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", get(get_user))
        .route("/api/admin/users/{id}/role", put(update_roles))
        .route("/api/admin/users/{id}/lock", put(set_lock))
        .route("/api/admin/users/{id}/expiry", put(update_expiry))
}
