//! API routes

mod admin;
mod auth;
mod health;
mod hello;
mod notes;
pub mod types;

use axum::{middleware, Router};

use crate::state::AppState;

/// Create the main router
///
/// The authentication gate and the policy layer are composed here, in
/// order: the gate (outermost) attaches the request's identity context
/// exactly once, then the policy layer allows or denies, then the matched
/// handler runs.
pub fn create_router(state: AppState) -> Router {
    let auth_layer = state.auth_layer();

    Router::new()
        // Health checks
        .merge(health::routes())
        // Probe endpoints
        .merge(hello::routes())
        // Login and token inspection
        .merge(auth::routes())
        // Notes API
        .merge(notes::routes())
        // Account management
        .merge(admin::routes())
        // Layers run outermost-last: authenticate wraps authorize
        .layer(middleware::from_fn_with_state(
            auth_layer.clone(),
            notevault_auth::authorize,
        ))
        .layer(middleware::from_fn_with_state(
            auth_layer,
            notevault_auth::authenticate,
        ))
        .with_state(state)
}
