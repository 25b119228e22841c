use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{InsertVaccination, Vaccination};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{json_body, parse_id, JsonBody};

/// GET /api/animals/:id/vaccinations
pub async fn vaccinations_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(animal_id): Path<String>,
) -> ApiResult<Vec<Vaccination>> {
    let animal_id = parse_id(&animal_id, EntityKind::Animal)?;
    Ok(Json(state.store.list_vaccinations(user.id, animal_id).await?))
}

/// POST /api/vaccinations
pub async fn vaccination_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<Vaccination> {
    let insert = InsertVaccination::validate(&json_body(body)?)?;
    Ok(Json(state.store.create_vaccination(user.id, insert).await?))
}

/// DELETE /api/vaccinations/:id
pub async fn vaccination_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::Vaccination) {
        state.store.delete_vaccination(user.id, id).await?;
    }
    Ok(Deleted)
}
