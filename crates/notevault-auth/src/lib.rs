//! notevault Authentication and Authorization
//!
//! This crate provides stateless JWT-based authentication and role-based
//! access control for notevault: the token codec, the per-request
//! authentication gate, the declarative route access policy, and password
//! hashing.

pub mod account;
pub mod context;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use account::check_account_status;
pub use context::{AuthContext, AuthUser};
pub use error::{AuthError, TokenError};
pub use jwt::{Claims, JwtCodec};
pub use middleware::{authenticate, authorize, AuthLayerState};
pub use password::{hash_password, verify_password};
pub use policy::{AccessPolicy, RoleRule, RouteAccess};
