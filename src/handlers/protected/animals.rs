use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{Animal, AnimalPatch, InsertAnimal};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{found, json_body, parse_id, JsonBody};

/// GET /api/animals
pub async fn animals_list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Animal>> {
    Ok(Json(state.store.list_animals(user.id).await?))
}

/// POST /api/animals
pub async fn animal_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<Animal> {
    let insert = InsertAnimal::validate(&json_body(body)?)?;
    let animal = state.store.create_animal(user.id, insert).await?;
    tracing::info!(animal_id = %animal.id, user_id = %user.id, "Animal created");
    Ok(Json(animal))
}

/// GET /api/animals/:id
pub async fn animal_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Animal> {
    let id = parse_id(&id, EntityKind::Animal)?;
    let animal = state.store.get_animal(user.id, id).await?;
    Ok(Json(found(animal, EntityKind::Animal)?))
}

/// PATCH /api/animals/:id
pub async fn animal_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<Animal> {
    let id = parse_id(&id, EntityKind::Animal)?;
    let patch = AnimalPatch::validate(&json_body(body)?)?;
    Ok(Json(state.store.update_animal(user.id, id, patch).await?))
}

/// DELETE /api/animals/:id - also removes the animal's vaccinations
pub async fn animal_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::Animal) {
        state.store.delete_animal(user.id, id).await?;
    }
    Ok(Deleted)
}
