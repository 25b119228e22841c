use axum::extract::State;
use axum::Json;

use crate::database::models::MarketListing;
use crate::middleware::ApiResult;
use crate::state::AppState;

/// GET /api/market/listings - active listings from every producer
pub async fn listings_public(State(state): State<AppState>) -> ApiResult<Vec<MarketListing>> {
    Ok(Json(state.store.list_public_listings().await?))
}
