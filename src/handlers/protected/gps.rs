use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{GpsRoute, InsertGpsRoute};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{found, json_body, parse_id, JsonBody};

/// GET /api/gps/routes
pub async fn routes_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<GpsRoute>> {
    Ok(Json(state.store.list_routes(user.id).await?))
}

/// POST /api/gps/routes
pub async fn route_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<GpsRoute> {
    let insert = InsertGpsRoute::validate(&json_body(body)?)?;
    Ok(Json(state.store.create_route(user.id, insert).await?))
}

/// GET /api/gps/routes/:id
pub async fn route_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<GpsRoute> {
    let id = parse_id(&id, EntityKind::GpsRoute)?;
    let route = state.store.get_route(user.id, id).await?;
    Ok(Json(found(route, EntityKind::GpsRoute)?))
}

/// DELETE /api/gps/routes/:id
pub async fn route_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::GpsRoute) {
        state.store.delete_route(user.id, id).await?;
    }
    Ok(Deleted)
}
