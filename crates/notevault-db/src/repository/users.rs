//! User account operations

use chrono::Utc;
use sqlx::Row;
use std::collections::BTreeSet;

use crate::error::DbError;
use crate::models::{join_roles, ExpiryUpdate, NewUser, Role, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        let existing = self.get_user_by_username(&user.username).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                username, email, password_hash, roles,
                enabled, account_non_locked, account_non_expired, credentials_non_expired,
                account_expiry_date, credentials_expiry_date,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(join_roles(&user.roles))
        .bind(user.enabled)
        .bind(user.account_non_locked)
        .bind(user.account_non_expired)
        .bind(user.credentials_non_expired)
        .bind(user.account_expiry_date.map(|d| d.to_string()))
        .bind(user.credentials_expiry_date.map(|d| d.to_string()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
            enabled: user.enabled,
            account_non_locked: user.account_non_locked,
            account_non_expired: user.account_non_expired,
            credentials_non_expired: user.credentials_non_expired,
            account_expiry_date: user.account_expiry_date,
            credentials_expiry_date: user.credentials_expiry_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT * FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| User::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT * FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| User::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM users ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Replace a user's role set
    pub async fn update_user_roles(&self, id: i64, roles: &BTreeSet<Role>) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users SET roles = ?, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(join_roles(roles))
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock or unlock an account
    pub async fn set_account_lock(&self, id: i64, locked: bool) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users SET account_non_locked = ?, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(!locked)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Extend account and/or credential expiry dates
    ///
    /// Only the dates present in the update are touched.
    pub async fn update_user_expiry(&self, id: i64, update: ExpiryUpdate) -> Result<bool, DbError> {
        let now = Utc::now();
        let mut affected = false;

        if let Some(date) = update.account_expiry_date {
            let result = sqlx::query(
                r#"
                UPDATE users SET account_expiry_date = ?, updated_at = ? WHERE id = ?
                "#,
            )
            .bind(date.to_string())
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
            affected |= result.rows_affected() > 0;
        }

        if let Some(date) = update.credentials_expiry_date {
            let result = sqlx::query(
                r#"
                UPDATE users SET credentials_expiry_date = ?, updated_at = ? WHERE id = ?
                "#,
            )
            .bind(date.to_string())
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
            affected |= result.rows_affected() > 0;
        }

        Ok(affected)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}
