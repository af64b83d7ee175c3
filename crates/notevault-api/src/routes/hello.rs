//! Minimal probe endpoints
//!
//! `/hello` sits in front of the policy's public rule, `/contact` behind the
//! authenticated default; together they exercise both sides of the gate.

use axum::{routing::get, Router};

use crate::state::AppState;

async fn hello() -> &'static str {
    "Hello"
}

async fn contact() -> &'static str {
    "contact"
}

/// Create hello routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hello", get(hello))
        .route("/contact", get(contact))
}
