use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{InsertNote, Note, NotePatch};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{found, json_body, parse_id, JsonBody};

/// GET /api/notes
pub async fn notes_list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Note>> {
    Ok(Json(state.store.list_notes(user.id).await?))
}

/// POST /api/notes
pub async fn note_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<Note> {
    let insert = InsertNote::validate(&json_body(body)?)?;
    Ok(Json(state.store.create_note(user.id, insert).await?))
}

/// GET /api/notes/:id
pub async fn note_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    let id = parse_id(&id, EntityKind::Note)?;
    let note = state.store.get_note(user.id, id).await?;
    Ok(Json(found(note, EntityKind::Note)?))
}

/// PATCH /api/notes/:id
pub async fn note_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Note> {
    let id = parse_id(&id, EntityKind::Note)?;
    let patch = NotePatch::validate(&json_body(body)?)?;
    Ok(Json(state.store.update_note(user.id, id, patch).await?))
}

/// DELETE /api/notes/:id
pub async fn note_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::Note) {
        state.store.delete_note(user.id, id).await?;
    }
    Ok(Deleted)
}
