use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;

use crate::database::models::{InsertReminder, Reminder, ReminderPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{found, json_body, parse_id, JsonBody};

/// GET /api/reminders
pub async fn reminders_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<Reminder>> {
    Ok(Json(state.store.list_reminders(user.id).await?))
}

/// GET /api/reminders/today - pending reminders, urgent first
pub async fn reminders_today(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<Reminder>> {
    let reminders = &state.config.reminders;
    let offset = reminders
        .offset()
        .ok_or_else(|| ApiError::internal_server_error("Invalid reminders UTC offset"))?;
    let now = Utc::now().with_timezone(&offset);
    Ok(Json(state.store.today_reminders(user.id, reminders.today_window, now).await?))
}

/// POST /api/reminders
pub async fn reminder_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<Reminder> {
    let insert = InsertReminder::validate(&json_body(body)?)?;
    Ok(Json(state.store.create_reminder(user.id, insert).await?))
}

/// GET /api/reminders/:id
pub async fn reminder_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Reminder> {
    let id = parse_id(&id, EntityKind::Reminder)?;
    let reminder = state.store.get_reminder(user.id, id).await?;
    Ok(Json(found(reminder, EntityKind::Reminder)?))
}

/// PATCH /api/reminders/:id
pub async fn reminder_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Reminder> {
    let id = parse_id(&id, EntityKind::Reminder)?;
    let patch = ReminderPatch::validate(&json_body(body)?)?;
    Ok(Json(state.store.update_reminder(user.id, id, patch).await?))
}

/// DELETE /api/reminders/:id
pub async fn reminder_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::Reminder) {
        state.store.delete_reminder(user.id, id).await?;
    }
    Ok(Deleted)
}
