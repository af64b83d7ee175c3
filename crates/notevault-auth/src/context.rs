//! Request-scoped authentication context

use notevault_db::{Role, User};
use std::collections::BTreeSet;

/// Authenticated principal attached to a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Request-scoped authentication state
///
/// Inserted into the request's extensions by the authentication gate and
/// read by the policy layer and handlers downstream. Each request owns its
/// own context; there is no process-wide authentication state.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<AuthUser>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|u| u.roles.contains(&role))
    }

    /// Identity name for audit logging
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("anonymous")
    }
}
