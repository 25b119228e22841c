// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler takes `AuthUser` ahead of its other extractors, so anonymous
// requests are rejected with 401 before a body is parsed or the store is hit.
// The authenticated id is the only owner a handler ever passes to the store.
pub mod animals;
pub mod auth;
pub mod gps;
pub mod market;
pub mod notes;
pub mod reminders;
pub mod semeia;
pub mod vaccinations;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::types::EntityKind;

/// Body type for create/update handlers; rejections become 400 INVALID_JSON.
pub type JsonBody = Result<Json<Value>, JsonRejection>;

pub(crate) fn json_body(body: JsonBody) -> Result<Value, ApiError> {
    let Json(value) = body?;
    Ok(value)
}

/// A malformed id can never match a record, so it is a plain 404.
pub(crate) fn parse_id(raw: &str, kind: EntityKind) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found(kind))
}

pub(crate) fn not_found(kind: EntityKind) -> ApiError {
    ApiError::not_found(format!("{} not found", kind.label()))
}

pub(crate) fn found<T>(record: Option<T>, kind: EntityKind) -> Result<T, ApiError> {
    record.ok_or_else(|| not_found(kind))
}
