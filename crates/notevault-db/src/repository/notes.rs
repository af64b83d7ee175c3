//! Note operations
//!
//! Every query is scoped by owner; a note belonging to another user is
//! indistinguishable from a note that does not exist.

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewNote, Note};
use crate::repository::Database;

impl Database {
    // ==================== Note Operations ====================

    /// Insert a new note
    pub async fn insert_note(&self, note: NewNote) -> Result<Note, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO notes (owner_username, content, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&note.owner_username)
        .bind(&note.content)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Note {
            id,
            owner_username: note.owner_username,
            content: note.content,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all notes owned by a user
    pub async fn notes_for_owner(&self, owner: &str) -> Result<Vec<Note>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM notes WHERE owner_username = ? ORDER BY id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Note::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a single note, scoped to its owner
    pub async fn get_note_for_owner(&self, id: i64, owner: &str) -> Result<Option<Note>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT * FROM notes WHERE id = ? AND owner_username = ?
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Note::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Update a note's content, scoped to its owner
    pub async fn update_note_for_owner(
        &self,
        id: i64,
        owner: &str,
        content: &str,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE notes SET content = ?, updated_at = ?
            WHERE id = ? AND owner_username = ?
            "#,
        )
        .bind(content)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a note, scoped to its owner
    pub async fn delete_note_for_owner(&self, id: i64, owner: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_username = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
