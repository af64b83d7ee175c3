//! Request extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use notevault_auth::{AuthContext, AuthUser};

use crate::error::ApiError;

/// Extractor for the authenticated principal
///
/// Reads the context attached by the authentication gate. On routes behind
/// an `authenticated` or `role:` rule the policy layer has already denied
/// anonymous callers; the rejection here only fires if a handler is wired
/// onto a public route by mistake.
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.user().cloned())
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}
