//! Declarative route access policy
//!
//! An ordered table of path-pattern rules evaluated first-match-wins.
//! Evaluation is a pure function of the request path and the authentication
//! context, so policy can be asserted in tests without standing up routing.

use std::fmt;
use std::str::FromStr;

use notevault_db::Role;
use tracing::debug;

use crate::context::AuthContext;
use crate::error::AuthError;

/// Access requirement for a group of routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Allow regardless of authentication state
    Public,
    /// Allow any resolved identity
    Authenticated,
    /// Allow identities holding the given role
    Role(Role),
}

impl fmt::Display for RouteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAccess::Public => write!(f, "public"),
            RouteAccess::Authenticated => write!(f, "authenticated"),
            RouteAccess::Role(role) => write!(f, "role:{}", role.as_str()),
        }
    }
}

impl FromStr for RouteAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(RouteAccess::Public),
            "authenticated" => Ok(RouteAccess::Authenticated),
            _ => match s.strip_prefix("role:") {
                Some(role) => Role::from_str(role)
                    .map(RouteAccess::Role)
                    .map_err(|e| e.to_string()),
                None => Err(format!("Invalid route access: {}", s)),
            },
        }
    }
}

/// A single pattern → access rule
#[derive(Debug, Clone)]
pub struct RoleRule {
    pattern: String,
    parts: Vec<PatternPart>,
    access: RouteAccess,
}

impl RoleRule {
    pub fn new(pattern: impl Into<String>, access: RouteAccess) -> Self {
        let pattern = pattern.into();
        let parts = compile_pattern(&pattern);
        Self {
            pattern,
            parts,
            access,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> &RouteAccess {
        &self.access
    }

    fn matches(&self, path: &str) -> bool {
        match_pattern(&self.parts, path, 0, 0)
    }
}

/// Ordered route access table
///
/// Rules are evaluated in declared order; the first matching pattern wins.
/// Paths no rule matches require an authenticated identity, so unclassified
/// routes deny anonymous callers rather than leaking.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<RoleRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// Resolve the access requirement for a path
    pub fn access_for(&self, path: &str) -> &RouteAccess {
        for rule in &self.rules {
            if rule.matches(path) {
                debug!(path = %path, pattern = %rule.pattern, access = %rule.access, "route rule matched");
                return &rule.access;
            }
        }
        &RouteAccess::Authenticated
    }

    /// Evaluate the table against a request
    ///
    /// On deny, anonymous callers get `AuthenticationRequired` (401) and
    /// authenticated callers missing the role get `InsufficientPermissions`
    /// (403). Nothing here reveals why a presented token was unusable.
    pub fn authorize(&self, path: &str, context: &AuthContext) -> Result<(), AuthError> {
        match self.access_for(path) {
            RouteAccess::Public => Ok(()),
            RouteAccess::Authenticated => {
                if context.is_authenticated() {
                    Ok(())
                } else {
                    Err(AuthError::AuthenticationRequired)
                }
            }
            RouteAccess::Role(role) => {
                if !context.is_authenticated() {
                    Err(AuthError::AuthenticationRequired)
                } else if !context.has_role(*role) {
                    Err(AuthError::InsufficientPermissions)
                } else {
                    Ok(())
                }
            }
        }
    }
}

// ==================== Pattern Matching ====================
//
// Path glob matching: `*` matches within a single path segment, `**` matches
// across segments.

#[derive(Debug, Clone)]
enum PatternPart {
    Literal(String),
    SingleWildcard,
    MultiWildcard,
}

fn compile_pattern(pattern: &str) -> Vec<PatternPart> {
    let mut parts = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '*' {
            if !current.is_empty() {
                parts.push(PatternPart::Literal(current.clone()));
                current.clear();
            }

            if i + 1 < chars.len() && chars[i + 1] == '*' {
                parts.push(PatternPart::MultiWildcard);
                i += 2;
            } else {
                parts.push(PatternPart::SingleWildcard);
                i += 1;
            }
        } else {
            current.push(ch);
            i += 1;
        }
    }

    if !current.is_empty() {
        parts.push(PatternPart::Literal(current));
    }

    parts
}

fn match_pattern(parts: &[PatternPart], path: &str, part_idx: usize, path_pos: usize) -> bool {
    if part_idx >= parts.len() {
        return path_pos >= path.len();
    }

    let path_remaining = &path[path_pos..];

    match &parts[part_idx] {
        PatternPart::Literal(lit) => {
            if path_remaining.starts_with(lit) {
                match_pattern(parts, path, part_idx + 1, path_pos + lit.len())
            } else {
                false
            }
        }
        PatternPart::SingleWildcard => {
            if let Some(slash_pos) = path_remaining.find('/') {
                match_pattern(parts, path, part_idx + 1, path_pos + slash_pos)
            } else {
                match_pattern(parts, path, part_idx + 1, path.len())
            }
        }
        PatternPart::MultiWildcard => {
            let remaining_parts = &parts[part_idx + 1..];

            if remaining_parts.is_empty() {
                return true;
            }

            for i in 0..=path_remaining.len() {
                if match_pattern(parts, path, part_idx + 1, path_pos + i) {
                    return true;
                }
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AuthUser;
    use std::collections::BTreeSet;

    fn user_ctx(roles: &[Role]) -> AuthContext {
        AuthContext::authenticated(AuthUser {
            id: 1,
            username: "testuser".to_string(),
            roles: roles.iter().copied().collect::<BTreeSet<_>>(),
        })
    }

    fn test_policy() -> AccessPolicy {
        AccessPolicy::new(vec![
            RoleRule::new("/api/auth/public/**", RouteAccess::Public),
            RoleRule::new("/hello", RouteAccess::Public),
            RoleRule::new("/api/admin/**", RouteAccess::Role(Role::Admin)),
        ])
    }

    #[test]
    fn test_route_access_parsing() {
        assert_eq!("public".parse::<RouteAccess>().unwrap(), RouteAccess::Public);
        assert_eq!(
            "authenticated".parse::<RouteAccess>().unwrap(),
            RouteAccess::Authenticated
        );
        assert_eq!(
            "role:ROLE_ADMIN".parse::<RouteAccess>().unwrap(),
            RouteAccess::Role(Role::Admin)
        );
        assert!("role:ROLE_NOPE".parse::<RouteAccess>().is_err());
        assert!("wide-open".parse::<RouteAccess>().is_err());
    }

    #[test]
    fn test_public_routes_allow_anonymous() {
        let policy = test_policy();
        let anon = AuthContext::anonymous();

        assert!(policy.authorize("/hello", &anon).is_ok());
        assert!(policy.authorize("/api/auth/public/signin", &anon).is_ok());
    }

    #[test]
    fn test_unmatched_paths_require_authentication() {
        let policy = test_policy();

        let denied = policy.authorize("/api/notes", &AuthContext::anonymous());
        assert!(matches!(denied, Err(AuthError::AuthenticationRequired)));

        assert!(policy.authorize("/api/notes", &user_ctx(&[Role::User])).is_ok());
    }

    #[test]
    fn test_admin_prefix_requires_role() {
        let policy = test_policy();

        let missing_role = policy.authorize("/api/admin/users", &user_ctx(&[Role::User]));
        assert!(matches!(
            missing_role,
            Err(AuthError::InsufficientPermissions)
        ));

        let anon = policy.authorize("/api/admin/users", &AuthContext::anonymous());
        assert!(matches!(anon, Err(AuthError::AuthenticationRequired)));

        assert!(policy
            .authorize("/api/admin/users", &user_ctx(&[Role::Admin]))
            .is_ok());
    }

    #[test]
    fn test_first_match_wins() {
        // A later, broader rule cannot override an earlier, specific one
        let policy = AccessPolicy::new(vec![
            RoleRule::new("/api/admin/health", RouteAccess::Public),
            RoleRule::new("/api/admin/**", RouteAccess::Role(Role::Admin)),
        ]);

        let anon = AuthContext::anonymous();
        assert!(policy.authorize("/api/admin/health", &anon).is_ok());
        assert!(policy.authorize("/api/admin/users", &anon).is_err());
    }

    #[test]
    fn test_wildcard_scope() {
        let single = RoleRule::new("/api/*/list", RouteAccess::Public);
        assert!(single.matches("/api/notes/list"));
        assert!(!single.matches("/api/a/b/list"));

        let multi = RoleRule::new("/api/**", RouteAccess::Public);
        assert!(multi.matches("/api/a/b/c"));
        assert!(!multi.matches("/health"));

        // Exact literals match only themselves
        let exact = RoleRule::new("/hello", RouteAccess::Public);
        assert!(exact.matches("/hello"));
        assert!(!exact.matches("/hello/world"));
    }
}
