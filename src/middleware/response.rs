use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::error::ApiError;

/// Handler result carrying a bare JSON body
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Body returned by every delete route
#[derive(Debug, Clone, Copy)]
pub struct Deleted;

impl IntoResponse for Deleted {
    fn into_response(self) -> Response {
        Json(json!({ "success": true })).into_response()
    }
}
