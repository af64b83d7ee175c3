//! Authentication middleware for Axum
//!
//! Two pipeline stages composed at router build time:
//!
//! - [`authenticate`] runs once per request, before routing decisions. It
//!   only ever enriches the request with an [`AuthContext`]; it never
//!   rejects. A missing header, a bad token, a vanished account, or a store
//!   outage all collapse to an anonymous context with the kind logged.
//! - [`authorize`] evaluates the [`AccessPolicy`] table against the request
//!   path and the attached context. This is the only place in the subsystem
//!   that turns a request away.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use notevault_db::Database;
use tracing::{debug, warn};

use crate::account::check_account_status;
use crate::context::{AuthContext, AuthUser};
use crate::error::AuthError;
use crate::jwt::JwtCodec;
use crate::policy::AccessPolicy;

/// State shared by the authentication and authorization stages
#[derive(Clone)]
pub struct AuthLayerState {
    pub codec: Arc<JwtCodec>,
    pub db: Database,
    pub policy: Arc<AccessPolicy>,
}

/// Extract the bearer token from the Authorization header
///
/// Absence of the header or of the `Bearer ` prefix is not an error; the
/// request simply carries no candidate token.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication gate middleware
///
/// Attaches an [`AuthContext`] to the request extensions and unconditionally
/// continues the pipeline.
pub async fn authenticate(
    State(state): State<AuthLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_context(&state, request.headers()).await;
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Resolve the request's identity; every failure path collapses to anonymous
async fn resolve_context(state: &AuthLayerState, headers: &HeaderMap) -> AuthContext {
    let Some(token) = bearer_token(headers) else {
        return AuthContext::anonymous();
    };

    let claims = match state.codec.verify(token) {
        Ok(claims) => claims,
        Err(kind) => {
            debug!(error = %kind, "token verification failed");
            return AuthContext::anonymous();
        }
    };

    let user = match state.db.get_user_by_username(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(subject = %claims.sub, "token subject no longer exists");
            return AuthContext::anonymous();
        }
        Err(err) => {
            // A store outage must not take down public routes; protected
            // routes deny downstream anyway.
            warn!(error = %err, "identity lookup failed during authentication");
            return AuthContext::anonymous();
        }
    };

    if let Err(reason) = check_account_status(&user) {
        debug!(username = %user.username, reason = %reason, "account not eligible to authenticate");
        return AuthContext::anonymous();
    }

    debug!(username = %user.username, "authenticated request");
    AuthContext::authenticated(AuthUser::from(&user))
}

/// Authorization middleware
///
/// Runs after [`authenticate`]; consults the policy table and denies with
/// 401 (anonymous) or 403 (missing role). Denials are logged with the path
/// and the resolved-or-absent identity; never with the presented token.
pub async fn authorize(
    State(state): State<AuthLayerState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_default();

    let path = request.uri().path();
    if let Err(denial) = state.policy.authorize(path, &context) {
        warn!(path = %path, identity = %context.display_name(), reason = %denial, "request denied");
        return Err(denial);
    }

    Ok(next.run(request).await)
}
