//! Database models

use crate::utils::{parse_date_opt, parse_datetime_or_now};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidRole(String),
    EmptyRoleSet,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
            ParseError::EmptyRoleSet => write!(f, "Role set must not be empty"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Application role
///
/// Roles are a closed set; route rules reference them by name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            _ => Err(ParseError::InvalidRole(s.to_string())),
        }
    }
}

/// Parse a comma-joined role column into a role set
///
/// An account always carries at least one role; an empty column is a data
/// error, not an anonymous account.
pub fn parse_roles(s: &str) -> Result<BTreeSet<Role>, ParseError> {
    let roles = s
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(Role::from_str)
        .collect::<Result<BTreeSet<_>, _>>()?;
    if roles.is_empty() {
        return Err(ParseError::EmptyRoleSet);
    }
    Ok(roles)
}

/// Join a role set back into its comma-joined column form
pub fn join_roles(roles: &BTreeSet<Role>) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// User account model
///
/// The status flags and expiry dates gate authentication; they are mutated
/// only by the admin account-management operations and by seeding, never by
/// the authentication path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub enabled: bool,
    pub account_non_locked: bool,
    pub account_non_expired: bool,
    pub credentials_non_expired: bool,
    pub account_expiry_date: Option<NaiveDate>,
    pub credentials_expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub enabled: bool,
    pub account_non_locked: bool,
    pub account_non_expired: bool,
    pub credentials_non_expired: bool,
    pub account_expiry_date: Option<NaiveDate>,
    pub credentials_expiry_date: Option<NaiveDate>,
}

impl NewUser {
    /// A fully enabled account with a one-year expiry horizon
    pub fn active(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: BTreeSet<Role>,
    ) -> Self {
        let horizon = Utc::now().date_naive() + chrono::Days::new(365);
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            roles,
            enabled: true,
            account_non_locked: true,
            account_non_expired: true,
            credentials_non_expired: true,
            account_expiry_date: Some(horizon),
            credentials_expiry_date: Some(horizon),
        }
    }
}

/// Note model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub owner_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New note (for insertion)
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_username: String,
    pub content: String,
}

/// Partial update of a user's expiry dates
#[derive(Debug, Clone, Default)]
pub struct ExpiryUpdate {
    pub account_expiry_date: Option<NaiveDate>,
    pub credentials_expiry_date: Option<NaiveDate>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let roles_str: String = row.try_get("roles")?;
        let roles = parse_roles(&roles_str).map_err(|e| sqlx::Error::ColumnDecode {
            index: "roles".to_string(),
            source: Box::new(e),
        })?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            roles,
            enabled: row.try_get("enabled")?,
            account_non_locked: row.try_get("account_non_locked")?,
            account_non_expired: row.try_get("account_non_expired")?,
            credentials_non_expired: row.try_get("credentials_non_expired")?,
            account_expiry_date: parse_date_opt(
                row.try_get::<Option<String>, _>("account_expiry_date")?.as_deref(),
            ),
            credentials_expiry_date: parse_date_opt(
                row.try_get::<Option<String>, _>("credentials_expiry_date")?.as_deref(),
            ),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Note {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Note {
            id: row.try_get("id")?,
            owner_username: row.try_get("owner_username")?,
            content: row.try_get("content")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}
