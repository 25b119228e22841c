use axum::extract::{Path, State};
use axum::Json;

use crate::database::models::{InsertMarketListing, MarketListing, MarketListingPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser, Deleted};
use crate::state::AppState;
use crate::types::EntityKind;
use crate::validation::InsertShape;

use super::{found, json_body, parse_id, JsonBody};

/// POST /api/market/listings
pub async fn listing_create(
    State(state): State<AppState>,
    user: AuthUser,
    body: JsonBody,
) -> ApiResult<MarketListing> {
    let insert = InsertMarketListing::validate(&json_body(body)?)?;
    Ok(Json(state.store.create_listing(user.id, insert).await?))
}

/// GET /api/market/listings/mine - the caller's listings, active or not
pub async fn listings_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<MarketListing>> {
    Ok(Json(state.store.list_listings(user.id).await?))
}

/// GET /api/market/listings/:id
pub async fn listing_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<MarketListing> {
    let id = parse_id(&id, EntityKind::MarketListing)?;
    let listing = state.store.get_listing(user.id, id).await?;
    Ok(Json(found(listing, EntityKind::MarketListing)?))
}

/// PATCH /api/market/listings/:id
pub async fn listing_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: JsonBody,
) -> ApiResult<MarketListing> {
    let id = parse_id(&id, EntityKind::MarketListing)?;
    let patch = MarketListingPatch::validate(&json_body(body)?)?;
    Ok(Json(state.store.update_listing(user.id, id, patch).await?))
}

/// DELETE /api/market/listings/:id
pub async fn listing_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Deleted, ApiError> {
    if let Ok(id) = parse_id(&id, EntityKind::MarketListing) {
        state.store.delete_listing(user.id, id).await?;
    }
    Ok(Deleted)
}
