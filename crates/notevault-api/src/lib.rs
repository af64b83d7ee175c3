//! notevault REST API
//!
//! This crate provides the Axum-based HTTP API for notevault: the login and
//! token-inspection endpoints, the owner-scoped notes API, and the
//! administrative account-management API, all behind the authentication
//! gate and route access policy from `notevault-auth`.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::CurrentUser;
pub use routes::create_router;
pub use state::AppState;
