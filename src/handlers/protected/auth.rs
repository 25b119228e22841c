use axum::extract::State;
use axum::Json;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/auth/user - profile of the token's subject
pub async fn user_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    match state.store.get_user(user.id).await? {
        Some(profile) => Ok(Json(profile)),
        None => {
            tracing::warn!("Valid token for unknown user {}", user.id);
            Err(ApiError::unauthorized("User not found"))
        }
    }
}
