//! Request/Response DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Claim-inspection request (the caller submits its own token)
#[derive(Deserialize)]
pub struct IntrospectRequest {
    pub token: String,
}

// ==================== Note Types ====================

/// Create/update note request
#[derive(Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

/// Note response
#[derive(Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<notevault_db::Note> for NoteResponse {
    fn from(note: notevault_db::Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            created_at: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Admin Types ====================

/// User response (without password hash)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub enabled: bool,
    pub account_non_locked: bool,
    pub account_non_expired: bool,
    pub credentials_non_expired: bool,
    pub account_expiry_date: Option<NaiveDate>,
    pub credentials_expiry_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<notevault_db::User> for UserResponse {
    fn from(user: notevault_db::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
            enabled: user.enabled,
            account_non_locked: user.account_non_locked,
            account_non_expired: user.account_non_expired,
            credentials_non_expired: user.credentials_non_expired,
            account_expiry_date: user.account_expiry_date,
            credentials_expiry_date: user.credentials_expiry_date,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Replace a user's role set
#[derive(Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<String>,
}

/// Lock or unlock an account
#[derive(Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

/// Extend expiry dates; absent fields are left untouched
#[derive(Deserialize)]
pub struct ExpiryRequest {
    pub account_expiry_date: Option<NaiveDate>,
    pub credentials_expiry_date: Option<NaiveDate>,
}
