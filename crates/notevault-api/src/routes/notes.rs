//! Notes routes
//!
//! All operations are scoped to the authenticated owner; another user's
//! note is a 404, not a 403.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use notevault_db::NewNote;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

use super::types::{NoteRequest, NoteResponse};

/// Maximum allowed note length in bytes
const MAX_NOTE_LENGTH: usize = 10_000;

fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.is_empty() {
        return Err(ApiError::BadRequest("Note cannot be empty".to_string()));
    }
    if content.len() > MAX_NOTE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Note exceeds maximum length of {} bytes",
            MAX_NOTE_LENGTH
        )));
    }
    Ok(())
}

/// GET /api/notes
async fn list_notes(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = state.db.notes_for_owner(&user.username).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// POST /api/notes
async fn create_note(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    validate_content(&request.content)?;

    debug!("Creating note for user: {}", user.username);

    let note = state
        .db
        .insert_note(NewNote {
            owner_username: user.username,
            content: request.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(NoteResponse::from(note))))
}

/// PUT /api/notes/{id}
async fn update_note(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    validate_content(&request.content)?;

    let updated = state
        .db
        .update_note_for_owner(id, &user.username, &request.content)
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("Note: {}", id)));
    }

    let note = state
        .db
        .get_note_for_owner(id, &user.username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Note: {}", id)))?;

    Ok(Json(NoteResponse::from(note)))
}

/// DELETE /api/notes/{id}
async fn delete_note(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.db.delete_note_for_owner(id, &user.username).await?;

    if deleted {
        debug!("Deleted note {} for user: {}", id, user.username);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Note: {}", id)))
    }
}

/// Create note routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note))
        .route("/api/notes/{id}", delete(delete_note))
}
